use crate::envelope::DecodedUplink;
use crate::error::DomainResult;
use async_trait::async_trait;

/// Sink trait for decoded uplinks
/// Infrastructure (e.g. the driver binary) implements this trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DecodedUplinkSink: Send + Sync {
    /// Publish one decoded uplink
    async fn publish(&self, uplink: &DecodedUplink) -> DomainResult<()>;
}
