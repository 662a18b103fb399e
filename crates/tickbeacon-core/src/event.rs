//! Radio event model
//!
//! The OS Bluetooth stack is modeled as a closed set of event variants
//! delivered over a channel to a single state-machine handler, instead of
//! delegate-style override points. The backend that owns the actual radio
//! translates its callbacks into [`RadioEvent`]s; the core never calls into
//! the stack except through the [`crate::radio::RadioControl`] seam.

use std::fmt;

use tokio::sync::{mpsc, oneshot};

// ----------------------------------------------------------------------------
// Radio State
// ----------------------------------------------------------------------------

/// Power/authorization state of the underlying radio.
///
/// Externally driven; the core only acts on transitions into `PoweredOn` and
/// records everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    Unknown,
    Resetting,
    Unsupported,
    Unauthorized,
    PoweredOff,
    PoweredOn,
}

impl fmt::Display for RadioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RadioState::Unknown => "Unknown",
            RadioState::Resetting => "Resetting",
            RadioState::Unsupported => "Unsupported",
            RadioState::Unauthorized => "Unauthorized",
            RadioState::PoweredOff => "PoweredOff",
            RadioState::PoweredOn => "PoweredOn",
        };
        f.write_str(name)
    }
}

// ----------------------------------------------------------------------------
// Advertising State
// ----------------------------------------------------------------------------

/// Publication/advertising state owned exclusively by the core.
///
/// Transitions happen only in response to confirmed outcomes of publish and
/// advertise operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertisingState {
    Idle,
    ServicePublished,
    Advertising,
}

// ----------------------------------------------------------------------------
// Write Requests
// ----------------------------------------------------------------------------

/// Result returned to a central for a write request.
///
/// The peripheral acknowledges every selected write with success; the value
/// is never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Success,
}

/// A single pending ATT write from a central.
#[derive(Debug)]
pub struct WriteRequest {
    /// The written value. Ignored by contract, carried for telemetry.
    pub value: Vec<u8>,
    /// Completes the ATT transaction back on the radio side.
    pub responder: oneshot::Sender<WriteOutcome>,
}

impl WriteRequest {
    /// Create a request together with the receiving half of its responder.
    pub fn new(value: Vec<u8>) -> (Self, oneshot::Receiver<WriteOutcome>) {
        let (responder, outcome) = oneshot::channel();
        (Self { value, responder }, outcome)
    }
}

// ----------------------------------------------------------------------------
// Radio Events
// ----------------------------------------------------------------------------

/// Events the radio backend delivers to the peripheral state machine.
#[derive(Debug)]
pub enum RadioEvent {
    /// The radio moved to a new power/authorization state.
    StateChanged(RadioState),
    /// Outcome of a service publication attempt.
    ServiceAdded { error: Option<String> },
    /// Outcome of an advertise-start attempt.
    AdvertisingStarted { error: Option<String> },
    /// A batch of pending write requests arrived.
    WriteRequestsReceived { requests: Vec<WriteRequest> },
}

/// Sending half of the radio event channel, held by the backend.
pub type RadioEventSender = mpsc::UnboundedSender<RadioEvent>;

/// Receiving half of the radio event channel, consumed by the core run loop.
pub type RadioEventReceiver = mpsc::UnboundedReceiver<RadioEvent>;

/// Create the radio event channel.
pub fn radio_event_channel() -> (RadioEventSender, RadioEventReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names() {
        assert_eq!(RadioState::PoweredOn.to_string(), "PoweredOn");
        assert_eq!(RadioState::Unauthorized.to_string(), "Unauthorized");
    }

    #[test]
    fn test_write_request_responder() {
        tokio_test::block_on(async {
            let (request, outcome) = WriteRequest::new(vec![0x01]);
            request.responder.send(WriteOutcome::Success).unwrap();
            assert_eq!(outcome.await.unwrap(), WriteOutcome::Success);
        });
    }
}
