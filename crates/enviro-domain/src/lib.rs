pub mod envelope;
pub mod error;
pub mod normalizer;
pub mod repository;
pub mod uplink_decoder;
pub mod uplink_service;

pub use envelope::*;
pub use error::{DomainError, DomainResult};
pub use normalizer::{classify, normalize, EnvelopeShape};
pub use repository::DecodedUplinkSink;
pub use uplink_decoder::UplinkDecoder;
pub use uplink_service::UplinkService;
