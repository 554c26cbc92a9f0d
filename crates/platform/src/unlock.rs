use std::sync::atomic::{AtomicU64, Ordering};

/// Session-wide count of screen unlock events.
///
/// Desktop systems do not expose an unlock counter the way phones do, so the
/// count is fed from outside (a screensaver hook calling `ebox unlock`, which
/// the daemon forwards here). Only ever increases.
#[derive(Debug, Default)]
pub struct UnlockCounter {
    total: AtomicU64,
}

impl UnlockCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one unlock and returns the new total.
    pub fn record(&self) -> u64 {
        self.total.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}
