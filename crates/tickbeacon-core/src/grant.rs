//! Background execution grant lifecycle
//!
//! Wraps the OS-style mechanism that lets work continue for a bounded period
//! after normal execution would otherwise be suspended. A grant is acquired
//! when a counting run starts and must be released exactly once, whether the
//! run completes normally or the provider revokes the grant first. The
//! identifier slot is an atomic check-and-clear so the two release call sites
//! can never both fire.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::{PeripheralError, Result};

/// Sentinel marking a grant identifier slot as already cleared.
const INVALID_GRANT: u64 = u64::MAX;

// ----------------------------------------------------------------------------
// Grant Ledger
// ----------------------------------------------------------------------------

/// Counters for grants handed out and returned.
///
/// Invariant: `acquired == released` once all runs have ended.
#[derive(Debug, Default)]
pub struct GrantLedger {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl GrantLedger {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

// ----------------------------------------------------------------------------
// Execution Grant
// ----------------------------------------------------------------------------

/// A time-boxed permission to keep running.
///
/// Holds the grant identifier behind an atomic slot; [`ExecutionGrant::release`]
/// swaps in [`INVALID_GRANT`] so only the first caller performs the release.
pub struct ExecutionGrant {
    id: u64,
    slot: AtomicU64,
    granted_at: Instant,
    duration: Duration,
    expiry: watch::Receiver<bool>,
    ledger: Arc<GrantLedger>,
}

impl ExecutionGrant {
    /// The identifier assigned at acquisition.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether this grant still holds its identifier.
    pub fn is_active(&self) -> bool {
        self.slot.load(Ordering::SeqCst) != INVALID_GRANT
    }

    /// Time left before the provider revokes the grant.
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.granted_at.elapsed())
    }

    /// Resolves when the provider revokes the grant.
    ///
    /// Never resolves after a release already cleared the slot.
    pub async fn expired(&mut self) {
        while !*self.expiry.borrow() {
            if self.expiry.changed().await.is_err() {
                // Provider went away without revoking; nothing to wait for.
                std::future::pending::<()>().await;
            }
        }
        if !self.is_active() {
            std::future::pending::<()>().await;
        }
    }

    /// Release the grant, logging remaining-time telemetry.
    ///
    /// Returns `true` if this call performed the release, `false` if the
    /// identifier was already cleared by the other call path.
    pub fn release(&self) -> bool {
        let id = self.slot.swap(INVALID_GRANT, Ordering::SeqCst);
        if id == INVALID_GRANT {
            warn!("grant {} already released, ignoring", self.id);
            return false;
        }
        self.ledger.released.fetch_add(1, Ordering::SeqCst);
        info!(
            "released grant {} with {:.3}s remaining",
            id,
            self.remaining().as_secs_f64()
        );
        true
    }
}

// ----------------------------------------------------------------------------
// Grant Providers
// ----------------------------------------------------------------------------

/// Source of background execution grants.
#[async_trait::async_trait]
pub trait GrantProvider: Send + Sync + 'static {
    /// Request a grant. Failure is fatal to the counting run that asked.
    async fn acquire(&self) -> Result<ExecutionGrant>;
}

/// Grant provider backed by the tokio timer wheel.
///
/// Every grant is revoked a fixed duration after acquisition unless released
/// first.
pub struct TimedGrantProvider {
    duration: Duration,
    next_id: AtomicU64,
    ledger: Arc<GrantLedger>,
}

impl TimedGrantProvider {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            next_id: AtomicU64::new(1),
            ledger: Arc::new(GrantLedger::default()),
        }
    }

    /// Acquire/release counters, shared with every grant this provider issues.
    pub fn ledger(&self) -> Arc<GrantLedger> {
        Arc::clone(&self.ledger)
    }
}

#[async_trait::async_trait]
impl GrantProvider for TimedGrantProvider {
    async fn acquire(&self) -> Result<ExecutionGrant> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if id == INVALID_GRANT {
            return Err(PeripheralError::GrantUnavailable(
                "grant identifier space exhausted".to_string(),
            ));
        }

        let (expiry_tx, expiry_rx) = watch::channel(false);
        let duration = self.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            // The receiver is gone once the grant has been dropped; a failed
            // send is a revocation of a grant nobody holds anymore.
            let _ = expiry_tx.send(true);
        });

        self.ledger.acquired.fetch_add(1, Ordering::SeqCst);
        let grant = ExecutionGrant {
            id,
            slot: AtomicU64::new(id),
            granted_at: Instant::now(),
            duration,
            expiry: expiry_rx,
            ledger: Arc::clone(&self.ledger),
        };
        info!(
            "acquired grant {} with {:.3}s remaining",
            id,
            grant.remaining().as_secs_f64()
        );
        Ok(grant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_release_is_exactly_once() {
        let provider = TimedGrantProvider::new(Duration::from_secs(30));
        let grant = provider.acquire().await.unwrap();
        assert!(grant.is_active());

        assert!(grant.release());
        assert!(!grant.is_active());
        // Second release path must be a no-op.
        assert!(!grant.release());

        let ledger = provider.ledger();
        assert_eq!(ledger.acquired(), 1);
        assert_eq!(ledger.released(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_time_counts_down() {
        let provider = TimedGrantProvider::new(Duration::from_secs(30));
        let grant = provider.acquire().await.unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        let remaining = grant.remaining();
        assert!(remaining <= Duration::from_secs(20));
        assert!(remaining > Duration::from_secs(19));
        grant.release();
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_fires_after_duration() {
        let provider = TimedGrantProvider::new(Duration::from_secs(5));
        let mut grant = provider.acquire().await.unwrap();

        // Paused clock auto-advances to the revocation deadline.
        tokio::time::timeout(Duration::from_secs(10), grant.expired())
            .await
            .expect("grant should expire");
        assert!(grant.release());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_never_fires_after_release() {
        let provider = TimedGrantProvider::new(Duration::from_secs(5));
        let mut grant = provider.acquire().await.unwrap();
        assert!(grant.release());

        let expired = tokio::time::timeout(Duration::from_secs(10), grant.expired()).await;
        assert!(expired.is_err(), "released grant must not report expiry");
    }

    #[tokio::test(start_paused = true)]
    async fn test_identifiers_are_unique() {
        let provider = TimedGrantProvider::new(Duration::from_secs(30));
        let a = provider.acquire().await.unwrap();
        let b = provider.acquire().await.unwrap();
        assert_ne!(a.id(), b.id());
        a.release();
        b.release();
    }
}
