//! Time sources used to pick the bucket an event lands in.
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Source of "now", as time elapsed since the Unix epoch.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Duration;
}

/// Wall clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        let millis = chrono::Utc::now().timestamp_millis();
        // Pre-epoch system time collapses onto the first bucket.
        Duration::from_millis(u64::try_from(millis).unwrap_or(0))
    }
}

/// Clock that only moves when told to. Used by event replay and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Duration) -> Self {
        Self {
            millis: AtomicU64::new(duration_millis(start)),
        }
    }

    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn set(&self, now: Duration) {
        self.millis.store(duration_millis(now), Ordering::Release);
    }

    pub fn advance(&self, by: Duration) {
        let step = duration_millis(by);
        let mut current = self.millis.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(step);
            match self.millis.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::Acquire))
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
