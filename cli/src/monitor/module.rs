//! The capability set every metric module implements.

use std::sync::Arc;

use ebox_platform::SystemAccess;

use crate::monitor::context::ModuleContext;
use crate::monitor::notifier::NotifyError;

#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("Module is not started")]
    NotStarted,

    #[error("Alert delivery failed: {0}")]
    Alert(#[from] NotifyError),

    #[error("Module panicked: {0}")]
    Panicked(String),
}

/// Ordered name/value pairs a module reports.
///
/// Names are unique; inserting an existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataPoints(Vec<(String, String)>);

impl DataPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for DataPoints {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut points = DataPoints::new();
        for (name, value) in iter {
            points.insert(name, value);
        }
        points
    }
}

/// A metric source with its own cadence and status projections.
///
/// All calls for a given module happen sequentially on the scheduler's
/// execution context. `tick` and `check_alerts` must not block. The
/// projections (`data_points`, `compact`, `detail`, `headline`) are pure and
/// return neutral values before the first tick.
pub trait Module: Send {
    /// Stable unique identifier, also the config and store key.
    fn key(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn default_enabled(&self) -> bool;

    fn alive(&self) -> bool;

    /// Milliseconds between ticks. Always greater than zero.
    fn tick_interval_ms(&self) -> u64;

    /// Takes baseline readings and marks the module alive. Must not be called
    /// while already alive.
    fn start(&mut self, ctx: &ModuleContext, system: Arc<dyn SystemAccess>);

    /// Drops sampling state and marks the module not alive.
    fn stop(&mut self);

    fn tick(&mut self) -> Result<(), ModuleError>;

    /// Publishes out-of-band alerts derived from the latest tick.
    fn check_alerts(&mut self, ctx: &ModuleContext) -> Result<(), ModuleError>;

    fn data_points(&self) -> DataPoints;

    /// One short fragment for the single-line status.
    fn compact(&self) -> String;

    /// One or more lines for the expanded status.
    fn detail(&self) -> String;

    /// Leading value surfaced in the status title, if this module has one.
    fn headline(&self) -> Option<String> {
        None
    }
}
