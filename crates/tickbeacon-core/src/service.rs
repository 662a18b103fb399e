//! Peripheral service state machine
//!
//! Owns the radio/advertising state machine, the write-request handler, and
//! the lifecycle of the single counting run. Radio events arrive serialized
//! over one channel, so no two radio callbacks are ever handled concurrently;
//! the counting run lives on its own spawned task and shares only the atomic
//! busy flag with this handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::PeripheralConfig;
use crate::counter::{CountingTask, ProgressReceiver, ProgressSender};
use crate::event::{
    AdvertisingState, RadioEvent, RadioEventReceiver, RadioState, WriteOutcome, WriteRequest,
};
use crate::grant::GrantProvider;
use crate::profile::ServiceIdentity;
use crate::radio::RadioControl;

// ----------------------------------------------------------------------------
// Peripheral Service
// ----------------------------------------------------------------------------

/// The peripheral-role state machine.
///
/// The host constructs this exactly once and lets it run; there is no
/// shutdown API, by contract.
pub struct PeripheralService<R, G> {
    radio: R,
    grants: Arc<G>,
    config: PeripheralConfig,
    identity: ServiceIdentity,
    radio_state: RadioState,
    advertising: AdvertisingState,
    /// Single-active-run discipline: set while a counting run is alive.
    run_active: Arc<AtomicBool>,
    progress_tx: ProgressSender,
}

impl<R, G> PeripheralService<R, G>
where
    R: RadioControl,
    G: GrantProvider,
{
    /// Create the service together with the receiver of tick observations.
    pub fn new(radio: R, grants: Arc<G>, config: PeripheralConfig) -> (Self, ProgressReceiver) {
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let service = Self {
            radio,
            grants,
            config,
            identity: ServiceIdentity::default(),
            radio_state: RadioState::Unknown,
            advertising: AdvertisingState::Idle,
            run_active: Arc::new(AtomicBool::new(false)),
            progress_tx,
        };
        (service, progress_rx)
    }

    /// Last reported radio state.
    pub fn radio_state(&self) -> RadioState {
        self.radio_state
    }

    /// Current publication/advertising state.
    pub fn advertising_state(&self) -> AdvertisingState {
        self.advertising
    }

    /// Whether a counting run is currently alive.
    pub fn counting(&self) -> bool {
        self.run_active.load(Ordering::SeqCst)
    }

    /// Consume radio events until the backend closes the channel.
    pub async fn run(mut self, mut events: RadioEventReceiver) {
        info!("peripheral service starting");
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        info!("radio event channel closed, peripheral service stopping");
    }

    /// Dispatch one radio event to the state machine.
    pub async fn handle_event(&mut self, event: RadioEvent) {
        match event {
            RadioEvent::StateChanged(state) => self.on_state_changed(state).await,
            RadioEvent::ServiceAdded { error } => self.on_service_added(error).await,
            RadioEvent::AdvertisingStarted { error } => self.on_advertising_started(error),
            RadioEvent::WriteRequestsReceived { requests } => self.on_write_requests(requests),
        }
    }

    async fn on_state_changed(&mut self, state: RadioState) {
        info!("radio state changed: {}", state);
        self.radio_state = state;
        if state != RadioState::PoweredOn {
            // Recorded only. An in-flight counting run is deliberately not
            // cancelled here; see the design notes.
            return;
        }

        // Reset-before-publish keeps repeated PoweredOn entries idempotent.
        self.advertising = AdvertisingState::Idle;
        if let Err(e) = self.radio.reset_services().await {
            warn!("failed to reset services: {}", e);
            return;
        }
        info!("publishing service {}", self.identity.service);
        if let Err(e) = self.radio.publish_service(&self.identity).await {
            warn!("failed to publish service: {}", e);
        }
    }

    async fn on_service_added(&mut self, error: Option<String>) {
        match error {
            None => {
                info!("service added ok");
                self.advertising = AdvertisingState::ServicePublished;
                info!("start advertising");
                if let Err(e) = self.radio.start_advertising(&self.identity).await {
                    warn!("failed to start advertising: {}", e);
                }
            }
            Some(e) => {
                // Terminal until the next PoweredOn transition; no retry.
                warn!("service add failed: {}", e);
            }
        }
    }

    fn on_advertising_started(&mut self, error: Option<String>) {
        match error {
            None => {
                info!("advertising started ok");
                if self.advertising == AdvertisingState::ServicePublished {
                    self.advertising = AdvertisingState::Advertising;
                }
            }
            Some(e) => warn!("advertising failed to start: {}", e),
        }
    }

    fn on_write_requests(&mut self, requests: Vec<WriteRequest>) {
        info!("received {} write request(s)", requests.len());
        let mut requests = requests.into_iter();
        let Some(first) = requests.next() else {
            return;
        };
        let ignored = requests.len();
        if ignored > 0 {
            debug!("ignoring {} additional request(s) in batch", ignored);
        }

        // Acknowledge before anything else; the written value is never read.
        if first.responder.send(WriteOutcome::Success).is_err() {
            warn!("write requester went away before acknowledgment");
        }
        self.start_count();
    }

    fn start_count(&mut self) {
        if self.run_active.swap(true, Ordering::SeqCst) {
            // Acked on the wire, dropped as a trigger. One run at a time.
            warn!("counting run already active, ignoring write trigger");
            return;
        }
        info!("start counting");

        let task = CountingTask::new(&self.config);
        let grants = Arc::clone(&self.grants);
        let active = Arc::clone(&self.run_active);
        let progress = self.progress_tx.clone();
        tokio::spawn(async move {
            match grants.acquire().await {
                Ok(grant) => {
                    task.run(grant, progress).await;
                }
                Err(e) => {
                    // Nothing was acquired, so nothing is released.
                    error!("grant acquisition failed, abandoning counting run: {}", e);
                }
            }
            active.store(false, Ordering::SeqCst);
        });
    }
}
