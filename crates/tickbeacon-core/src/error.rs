//! Error types for the tickbeacon peripheral

use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors raised by the peripheral core and its radio backends.
///
/// All of these are local and terminal for the cycle they occur in: the core
/// logs them and waits for the next radio transition rather than propagating
/// them to the host.
#[derive(Error, Debug)]
pub enum PeripheralError {
    #[error("BLE adapter not available: {0}")]
    AdapterUnavailable(String),

    #[error("failed to publish GATT service: {0}")]
    ServicePublishFailed(String),

    #[error("failed to start advertising: {0}")]
    AdvertiseFailed(String),

    #[error("background execution grant unavailable: {0}")]
    GrantUnavailable(String),

    #[error("radio event channel closed")]
    EventChannelClosed,

    #[error("BLE peripheral role not supported on this platform")]
    Unsupported,
}

/// Result type used throughout the tickbeacon crates.
pub type Result<T> = std::result::Result<T, PeripheralError>;
