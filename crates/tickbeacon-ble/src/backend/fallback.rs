//! Fallback backend for platforms without peripheral support

use tracing::warn;

use tickbeacon_core::{
    PeripheralError, RadioControl, RadioEvent, RadioEventSender, RadioState, Result,
    ServiceIdentity,
};

// ----------------------------------------------------------------------------
// Fallback Implementation
// ----------------------------------------------------------------------------

/// Backend for platforms where the BLE peripheral role is unavailable.
///
/// Reports the radio as unsupported; the core then stays idle by design.
pub struct FallbackRadio {
    events: RadioEventSender,
}

impl FallbackRadio {
    pub fn new(events: RadioEventSender) -> Self {
        Self { events }
    }

    pub async fn start(&mut self) -> Result<()> {
        warn!(
            "BLE peripheral role not supported on this platform; the service will not be \
            published. Use Linux with BlueZ for full functionality."
        );
        let _ = self
            .events
            .send(RadioEvent::StateChanged(RadioState::Unsupported));
        Ok(())
    }
}

#[async_trait::async_trait]
impl RadioControl for FallbackRadio {
    async fn reset_services(&mut self) -> Result<()> {
        Ok(())
    }

    async fn publish_service(&mut self, _identity: &ServiceIdentity) -> Result<()> {
        Err(PeripheralError::Unsupported)
    }

    async fn start_advertising(&mut self, _identity: &ServiceIdentity) -> Result<()> {
        Err(PeripheralError::Unsupported)
    }
}
