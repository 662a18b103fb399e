//! Platform detection and backend dispatch

#[cfg(not(target_os = "linux"))]
mod fallback;
#[cfg(target_os = "linux")]
mod linux;

use tickbeacon_core::{RadioControl, RadioEventSender, Result, ServiceIdentity};

// ----------------------------------------------------------------------------
// Platform Radio
// ----------------------------------------------------------------------------

/// Platform-specific radio backend enum.
pub enum PlatformRadio {
    #[cfg(target_os = "linux")]
    Linux(linux::BluezRadio),
    #[cfg(not(target_os = "linux"))]
    Fallback(fallback::FallbackRadio),
}

impl PlatformRadio {
    /// Create the appropriate backend for the current platform.
    ///
    /// Radio events are delivered on the given sender.
    pub fn new(events: RadioEventSender) -> Self {
        #[cfg(target_os = "linux")]
        {
            Self::Linux(linux::BluezRadio::new(events))
        }
        #[cfg(not(target_os = "linux"))]
        {
            Self::Fallback(fallback::FallbackRadio::new(events))
        }
    }

    /// Bring the radio up: connect to the stack, report the initial power
    /// state, and start monitoring for power transitions.
    pub async fn start(&mut self) -> Result<()> {
        match self {
            #[cfg(target_os = "linux")]
            Self::Linux(radio) => radio.start().await,
            #[cfg(not(target_os = "linux"))]
            Self::Fallback(radio) => radio.start().await,
        }
    }
}

#[async_trait::async_trait]
impl RadioControl for PlatformRadio {
    async fn reset_services(&mut self) -> Result<()> {
        match self {
            #[cfg(target_os = "linux")]
            Self::Linux(radio) => radio.reset_services().await,
            #[cfg(not(target_os = "linux"))]
            Self::Fallback(radio) => radio.reset_services().await,
        }
    }

    async fn publish_service(&mut self, identity: &ServiceIdentity) -> Result<()> {
        match self {
            #[cfg(target_os = "linux")]
            Self::Linux(radio) => radio.publish_service(identity).await,
            #[cfg(not(target_os = "linux"))]
            Self::Fallback(radio) => radio.publish_service(identity).await,
        }
    }

    async fn start_advertising(&mut self, identity: &ServiceIdentity) -> Result<()> {
        match self {
            #[cfg(target_os = "linux")]
            Self::Linux(radio) => radio.start_advertising(identity).await,
            #[cfg(not(target_os = "linux"))]
            Self::Fallback(radio) => radio.start_advertising(identity).await,
        }
    }
}
