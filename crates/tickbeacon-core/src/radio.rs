//! Radio control seam between the state machine and platform backends

use crate::error::Result;
use crate::profile::ServiceIdentity;

// ----------------------------------------------------------------------------
// Radio Control Trait
// ----------------------------------------------------------------------------

/// Operations the core issues against the radio stack.
///
/// Implementations confirm `publish_service` and `start_advertising`
/// asynchronously through [`crate::event::RadioEvent::ServiceAdded`] and
/// [`crate::event::RadioEvent::AdvertisingStarted`] rather than through the
/// return value; an `Err` here means the operation could not even be issued.
#[async_trait::async_trait]
pub trait RadioControl: Send + Sync {
    /// Stop any prior advertising and clear previously published services.
    ///
    /// Issued before every publication so that repeated `PoweredOn`
    /// transitions republish from a clean slate.
    async fn reset_services(&mut self) -> Result<()>;

    /// Publish the service with its single write-only characteristic.
    async fn publish_service(&mut self, identity: &ServiceIdentity) -> Result<()>;

    /// Begin advertising, broadcasting only the service UUID.
    async fn start_advertising(&mut self, identity: &ServiceIdentity) -> Result<()>;
}
