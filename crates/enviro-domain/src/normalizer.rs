use crate::envelope::CanonicalUplink;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::Value;

/// The two known network-server envelope generations.
///
/// A record matches at most one shape; everything else is `Unmatched` and
/// silently dropped by the caller. Heterogeneous message streams routinely
/// carry non-payload records (join and confirmation frames), so an
/// unmatched record is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    Legacy,
    Modern,
    Unmatched,
}

/// Determine which envelope generation a record belongs to.
pub fn classify(record: &Value) -> EnvelopeShape {
    if record.get("port").is_some() && record.get("payload_raw").is_some() {
        return EnvelopeShape::Legacy;
    }
    if let Some(uplink) = record.get("uplink_message") {
        // Both v3 export variants occur in real captures: received_at nested
        // in uplink_message, or at the envelope level.
        let has_time = uplink.get("received_at").is_some() || record.get("received_at").is_some();
        if uplink.get("frm_payload").is_some() && uplink.get("f_port").is_some() && has_time {
            return EnvelopeShape::Modern;
        }
    }
    EnvelopeShape::Unmatched
}

/// Extract the canonical (port, payload bytes, timestamp) triple from a
/// raw envelope record.
///
/// Returns `None` for unmatched records, wrong-typed fields, and malformed
/// base64; none of those are errors. Legacy records without a parseable
/// `metadata.time` still normalize, with the timestamp absent.
pub fn normalize(record: &Value) -> Option<CanonicalUplink> {
    match classify(record) {
        EnvelopeShape::Legacy => {
            let port = u32::try_from(record.get("port")?.as_u64()?).ok()?;
            let encoded = record.get("payload_raw")?.as_str()?;
            let received_at = record
                .pointer("/metadata/time")
                .and_then(Value::as_str)
                .map(str::to_owned);
            Some(CanonicalUplink {
                port,
                payload: BASE64.decode(encoded).ok()?,
                received_at,
            })
        }
        EnvelopeShape::Modern => {
            let uplink = record.get("uplink_message")?;
            let port = u32::try_from(uplink.get("f_port")?.as_u64()?).ok()?;
            let encoded = uplink.get("frm_payload")?.as_str()?;
            let received_at = uplink
                .get("received_at")
                .or_else(|| record.get("received_at"))
                .and_then(Value::as_str)
                .map(str::to_owned);
            Some(CanonicalUplink {
                port,
                payload: BASE64.decode(encoded).ok()?,
                received_at,
            })
        }
        EnvelopeShape::Unmatched => None,
    }
}
