//! Time sources for the trial engines.
//!
//! The engines never wait. Deadlines are re-derived from `now()` and a
//! recorded start timestamp on every poll, and the host decides how often
//! it polls. Nothing here sleeps.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Monotonic time source, in nanoseconds since the clock's epoch.
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> u64;

    fn elapsed(&self, since: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(since))
    }
}

/// Nanoseconds since the Unix epoch, read once at construction and advanced
/// monotonically from there. Separately constructed instances agree, so
/// timestamps persisted by one engine stay valid for the next.
#[derive(Debug, Clone)]
pub struct HighPrecisionClock {
    start: Instant,
    origin_ns: u64,
}

impl HighPrecisionClock {
    pub fn new() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            start: Instant::now(),
            origin_ns: since_epoch.as_nanos() as u64,
        }
    }
}

impl Default for HighPrecisionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for HighPrecisionClock {
    fn now(&self) -> u64 {
        self.origin_ns + self.start.elapsed().as_nanos() as u64
    }
}

/// Settable clock. Clones share the same time, so a test can hand one clone
/// to an engine and move time forward through another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ns: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(now_ns: u64) -> Self {
        let clock = Self::default();
        clock.set(now_ns);
        clock
    }

    pub fn set(&self, now_ns: u64) {
        self.now_ns.store(now_ns, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now_ns
            .fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
}
