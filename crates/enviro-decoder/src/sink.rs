use async_trait::async_trait;
use enviro_domain::{DecodedUplink, DecodedUplinkSink, DomainResult};
use serde_json::{Value, json};
use std::sync::Mutex;

/// Collects decoded uplinks into one JSON array, in publish order.
///
/// Each entry carries the parsed timestamp as epoch milliseconds under
/// `ts` (null when the envelope carried none) followed by the decoded
/// fields.
pub struct JsonArraySink {
    entries: Mutex<Vec<Value>>,
}

impl JsonArraySink {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<Value> {
        self.entries.lock().unwrap().clone()
    }
}

impl Default for JsonArraySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecodedUplinkSink for JsonArraySink {
    async fn publish(&self, uplink: &DecodedUplink) -> DomainResult<()> {
        let ts = match uplink.occurred_at {
            Some(ts) => json!(ts.timestamp_millis()),
            None => Value::Null,
        };

        let mut entry = serde_json::Map::new();
        entry.insert("ts".to_string(), ts);
        entry.extend(uplink.data.clone());

        let mut entries = self.entries.lock().unwrap();
        entries.push(Value::Object(entry));
        Ok(())
    }
}
