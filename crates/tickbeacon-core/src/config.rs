//! Peripheral configuration

use std::time::Duration;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for the tickbeacon peripheral.
///
/// The service and characteristic UUIDs are intentionally not configurable;
/// see [`crate::profile`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PeripheralConfig {
    /// One-shot delay before the first tick of a counting run
    pub initial_delay: Duration,
    /// Delay between consecutive ticks
    pub tick_interval: Duration,
    /// Number of ticks in a full counting run
    pub max_count: u32,
    /// How long a background execution grant lasts before the provider
    /// revokes it
    pub grant_duration: Duration,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(15),
            tick_interval: Duration::from_millis(100),
            max_count: 20,
            grant_duration: Duration::from_secs(180),
        }
    }
}

impl PeripheralConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay before the first tick
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the inter-tick delay
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the number of ticks per counting run
    pub fn with_max_count(mut self, count: u32) -> Self {
        self.max_count = count;
        self
    }

    /// Set the background grant duration
    pub fn with_grant_duration(mut self, duration: Duration) -> Self {
        self.grant_duration = duration;
        self
    }
}
