use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

// Monotonic time source. Readings are offsets from an arbitrary origin; only
// differences between two readings carry meaning.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Advances by a fixed step on every reading, so two consecutive readings are
/// always exactly `step` apart.
pub struct StepClock {
    step:  Duration,
    ticks: AtomicU64,
}

impl StepClock {
    pub fn new(step: Duration) -> Self {
        Self { step, ticks: AtomicU64::new(0) }
    }

    pub fn readings(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl Clock for StepClock {
    fn now(&self) -> Duration {
        let n = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.step * n as u32
    }
}
