//! Platform radio backends for tickbeacon
//!
//! Each backend owns the actual OS Bluetooth stack and drives the core in two
//! directions: it translates stack callbacks into
//! [`tickbeacon_core::RadioEvent`]s on the event channel, and it implements
//! [`tickbeacon_core::RadioControl`] for the operations the state machine
//! issues.
//!
//! ## Platform Support
//!
//! - **Linux**: full peripheral role via the `bluer` crate (BlueZ) with GATT
//!   service registration and LE advertising
//! - **Other platforms**: fallback backend that reports the radio as
//!   unsupported

mod backend;

pub use backend::PlatformRadio;
