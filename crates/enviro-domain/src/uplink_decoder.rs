use crate::error::DomainResult;

/// Trait for decoding a canonical uplink payload into a JSON field map
///
/// Implementations should:
/// - Decode the binary payload for the given port
/// - Return a JSON object on success
/// - Return PayloadDecodeError when the payload is undecodable
#[cfg_attr(test, mockall::automock)]
pub trait UplinkDecoder: Send + Sync {
    /// Decode a binary uplink payload
    ///
    /// # Arguments
    /// * `f_port` - Logical port the uplink arrived on
    /// * `payload` - Raw payload bytes after base64 decoding
    fn decode_uplink(&self, f_port: u32, payload: &[u8]) -> DomainResult<serde_json::Value>;
}
