//! Bounded counting task
//!
//! One counting run: a fixed initial delay, then a fixed number of ticks at
//! a fixed interval, all under a background execution grant. Implemented as
//! an explicit timed loop on its own tokio task; each tick races the
//! inter-tick timer against grant expiration, so a revocation interrupts the
//! run at a tick boundary and never mid-observation.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

use crate::config::PeripheralConfig;
use crate::grant::ExecutionGrant;

// ----------------------------------------------------------------------------
// Progress Observations
// ----------------------------------------------------------------------------

/// One tick of a counting run, as observed by telemetry consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickProgress {
    pub count: u32,
    pub max: u32,
}

/// Observers of counting progress.
pub type ProgressSender = mpsc::UnboundedSender<TickProgress>;

/// Receiving half of the progress channel.
pub type ProgressReceiver = mpsc::UnboundedReceiver<TickProgress>;

// ----------------------------------------------------------------------------
// Counting Task
// ----------------------------------------------------------------------------

/// How a counting run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOutcome {
    /// All ticks were emitted.
    Completed,
    /// The grant was revoked before the run finished.
    Expired,
}

/// A single bounded counting run.
///
/// Exists only between "write accepted" and "count reached max / grant
/// expired"; it holds no state after [`CountingTask::run`] returns.
pub struct CountingTask {
    current_count: u32,
    max_count: u32,
    initial_delay: Duration,
    tick_interval: Duration,
}

impl CountingTask {
    pub fn new(config: &PeripheralConfig) -> Self {
        Self {
            current_count: 0,
            max_count: config.max_count,
            initial_delay: config.initial_delay,
            tick_interval: config.tick_interval,
        }
    }

    /// Run to completion or grant expiration, releasing the grant on every
    /// exit path.
    pub async fn run(mut self, mut grant: ExecutionGrant, progress: ProgressSender) -> CountOutcome {
        debug!(
            "will start counting in {:.3} secs",
            self.initial_delay.as_secs_f64()
        );

        tokio::select! {
            _ = time::sleep(self.initial_delay) => {}
            _ = grant.expired() => return self.abort(&grant),
        }

        loop {
            self.current_count += 1;
            info!("{}/{}", self.current_count, self.max_count);
            // A closed channel only means nobody is watching; the run goes on.
            let _ = progress.send(TickProgress {
                count: self.current_count,
                max: self.max_count,
            });

            if self.current_count >= self.max_count {
                grant.release();
                return CountOutcome::Completed;
            }

            // Approximate accumulation: each delay starts after the previous
            // observation, with no wall-clock anchoring.
            tokio::select! {
                _ = time::sleep(self.tick_interval) => {}
                _ = grant.expired() => return self.abort(&grant),
            }
        }
    }

    /// Expiration path: abandon the remaining ticks and release.
    fn abort(&self, grant: &ExecutionGrant) -> CountOutcome {
        warn!(
            "grant {} expired at {}/{}, abandoning remaining ticks",
            grant.id(),
            self.current_count,
            self.max_count
        );
        grant.release();
        CountOutcome::Expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::{GrantProvider, TimedGrantProvider};
    use tokio::time::Instant;

    fn config(initial: Duration, tick: Duration, max: u32) -> PeripheralConfig {
        PeripheralConfig::new()
            .with_initial_delay(initial)
            .with_tick_interval(tick)
            .with_max_count(max)
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_to_max_and_releases() {
        let provider = TimedGrantProvider::new(Duration::from_secs(60));
        let ledger = provider.ledger();
        let grant = provider.acquire().await.unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let cfg = config(Duration::from_secs(15), Duration::from_millis(100), 20);
        let outcome = CountingTask::new(&cfg).run(grant, tx).await;

        assert_eq!(outcome, CountOutcome::Completed);
        for expected in 1..=20 {
            let tick = rx.recv().await.unwrap();
            assert_eq!(tick.count, expected);
            assert_eq!(tick.max, 20);
        }
        assert!(rx.try_recv().is_err(), "no ticks after max");
        assert_eq!(ledger.acquired(), 1);
        assert_eq!(ledger.released(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_for_initial_delay() {
        let provider = TimedGrantProvider::new(Duration::from_secs(60));
        let grant = provider.acquire().await.unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let cfg = config(Duration::from_secs(15), Duration::from_millis(100), 1);
        let started = Instant::now();
        let handle = tokio::spawn(CountingTask::new(&cfg).run(grant, tx));

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.count, 1);
        assert!(started.elapsed() >= Duration::from_secs(15));
        assert_eq!(handle.await.unwrap(), CountOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiration_interrupts_at_tick_boundary() {
        // Revoked between the 7th and 8th tick: 15s + 6 * 100ms + 50ms.
        let provider = TimedGrantProvider::new(Duration::from_millis(15_650));
        let ledger = provider.ledger();
        let grant = provider.acquire().await.unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let cfg = config(Duration::from_secs(15), Duration::from_millis(100), 20);
        let outcome = CountingTask::new(&cfg).run(grant, tx).await;

        assert_eq!(outcome, CountOutcome::Expired);
        let mut last = 0;
        while let Ok(tick) = rx.try_recv() {
            assert_eq!(tick.count, last + 1);
            last = tick.count;
        }
        assert_eq!(last, 7, "ticks 8..20 must never fire");
        assert_eq!(ledger.released(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiration_before_first_tick() {
        let provider = TimedGrantProvider::new(Duration::from_secs(5));
        let ledger = provider.ledger();
        let grant = provider.acquire().await.unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let cfg = config(Duration::from_secs(15), Duration::from_millis(100), 20);
        let outcome = CountingTask::new(&cfg).run(grant, tx).await;

        assert_eq!(outcome, CountOutcome::Expired);
        assert!(rx.try_recv().is_err(), "no tick may fire after revocation");
        assert_eq!(ledger.released(), 1);
    }
}
