//! Core peripheral logic for tickbeacon
//!
//! tickbeacon advertises a single BLE service with one write-only
//! characteristic; any write is acknowledged with success and triggers a
//! bounded counting run executed under a time-boxed background execution
//! grant.
//!
//! ## Architecture
//!
//! - [`profile`] - fixed GATT service/characteristic identity
//! - [`event`] - radio event model delivered to the state machine
//! - [`radio`] - control seam implemented by platform backends
//! - [`grant`] - background execution grant lifecycle
//! - [`counter`] - the bounded counting task
//! - [`service`] - the peripheral state machine tying it all together
//! - [`config`] / [`error`] - configuration and error types
//!
//! The radio is modeled as an external event source: a backend (see the
//! `tickbeacon-ble` crate) feeds [`event::RadioEvent`]s into the channel the
//! service consumes, and confirms publish/advertise operations through the
//! same channel. This keeps the core free of any OS Bluetooth dependency and
//! fully testable with a mock radio and a paused clock.

pub mod config;
pub mod counter;
pub mod error;
pub mod event;
pub mod grant;
pub mod profile;
pub mod radio;
pub mod service;

// Public API exports
pub use config::PeripheralConfig;
pub use counter::{CountOutcome, CountingTask, ProgressReceiver, TickProgress};
pub use error::{PeripheralError, Result};
pub use event::{
    radio_event_channel, AdvertisingState, RadioEvent, RadioEventReceiver, RadioEventSender,
    RadioState, WriteOutcome, WriteRequest,
};
pub use grant::{ExecutionGrant, GrantLedger, GrantProvider, TimedGrantProvider};
pub use profile::{ServiceIdentity, TICKBEACON_CHARACTERISTIC_UUID, TICKBEACON_SERVICE_UUID};
pub use radio::RadioControl;
pub use service::PeripheralService;
