/// Canonical decode input extracted from a network-server envelope
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalUplink {
    pub port: u32,
    pub payload: Vec<u8>,
    /// Timestamp string as carried by the envelope; absent when the legacy
    /// shape lacked one or extraction failed.
    pub received_at: Option<String>,
}

/// Decoded uplink handed to the sink
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedUplink {
    pub occurred_at: Option<chrono::DateTime<chrono::Utc>>,
    pub port: u32,
    pub data: serde_json::Map<String, serde_json::Value>,
}
