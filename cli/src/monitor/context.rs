use std::sync::Arc;
use std::time::Instant;

use crate::monitor::notifier::Notifier;

/// Flat key/value settings the monitor reads.
///
/// Edits made by other processes become visible after [`refresh`], which the
/// scheduler calls at the start of every cycle.
///
/// [`refresh`]: Configuration::refresh
pub trait Configuration: Send + Sync {
    /// Picks up external edits. Cheap when nothing changed.
    fn refresh(&self) {}

    fn is_module_enabled(&self, key: &str, default: bool) -> bool;

    fn is_running(&self) -> bool;

    fn set_running(&self, running: bool);

    fn get_int(&self, key: &str, default: i64) -> i64;
}

/// Monotonic milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Handles a module holds on to between `start` and `stop`.
#[derive(Clone)]
pub struct ModuleContext {
    pub config: Arc<dyn Configuration>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

impl ModuleContext {
    pub fn new(
        config: Arc<dyn Configuration>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            notifier,
            clock,
        }
    }

    /// Reads an interval setting. Non-positive values fall back to `default`,
    /// so the result is always greater than zero.
    pub fn interval_ms(&self, key: &str, default: u64) -> u64 {
        match self.config.get_int(key, default as i64) {
            value if value > 0 => value as u64,
            _ => default.max(1),
        }
    }
}
