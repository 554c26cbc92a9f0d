//! Monitoring engine: modules, lifecycle, scheduling and reporting.

pub mod context;
pub mod format;
pub mod lifecycle;
pub mod module;
pub mod notifier;
pub mod registry;
pub mod report;
pub mod scheduler;
pub mod store;

#[cfg(test)]
pub mod testing;

pub use context::{Configuration, ModuleContext, MonotonicClock};
pub use module::{DataPoints, Module, ModuleError};
pub use notifier::{Notifier, StatusBoard};
pub use registry::Registry;
pub use scheduler::TickScheduler;
pub use store::AggregationStore;
