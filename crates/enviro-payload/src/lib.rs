pub mod enviropro;
mod error;

pub use enviropro::{EnviroProDecoder, MoistureReading, ProbeReading, TemperatureReading};
pub use error::{PayloadError, Result};

/// Trait for decoding binary payload formats to JSON
pub trait PayloadDecoder {
    /// Decode binary payload to JSON value
    fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value>;
}
