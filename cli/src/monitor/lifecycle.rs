//! Reconciles configured module state with what is actually running.

use std::collections::HashMap;
use std::sync::Arc;

use ebox_platform::SystemAccess;
use tracing::info;

use crate::monitor::context::ModuleContext;
use crate::monitor::registry::Registry;
use crate::monitor::store::AggregationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastTick {
    /// Started but not ticked yet. Always due.
    Pending,
    /// Monotonic ms of the last tick.
    At(u64),
}

/// Per-module last-tick times. An entry exists iff the module was started
/// this session and has not been stopped since.
#[derive(Debug, Default)]
pub struct ScheduleState {
    entries: HashMap<&'static str, LastTick>,
}

impl ScheduleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&mut self, key: &'static str) {
        self.entries.insert(key, LastTick::Pending);
    }

    pub fn record(&mut self, key: &'static str, now_ms: u64) {
        self.entries.insert(key, LastTick::At(now_ms));
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<LastTick> {
        self.entries.get(key).copied()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Marks every entry as never ticked.
    pub fn force_due_all(&mut self) {
        for last in self.entries.values_mut() {
            *last = LastTick::Pending;
        }
    }

    pub fn is_due(&self, key: &str, now_ms: u64, interval_ms: u64) -> bool {
        match self.get(key) {
            Some(LastTick::At(last)) => now_ms.saturating_sub(last) >= interval_ms,
            Some(LastTick::Pending) | None => true,
        }
    }

    /// When the module is next due. Pending modules are due right away.
    pub fn next_due(&self, key: &str, now_ms: u64, interval_ms: u64) -> u64 {
        match self.get(key) {
            Some(LastTick::At(last)) => last.saturating_add(interval_ms),
            Some(LastTick::Pending) | None => now_ms,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub started: Vec<&'static str>,
    pub stopped: Vec<&'static str>,
}

impl SyncOutcome {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.started.is_empty() && self.stopped.is_empty()
    }
}

pub struct LifecycleSynchronizer {
    ctx: ModuleContext,
    system: Arc<dyn SystemAccess>,
    store: Arc<AggregationStore>,
}

impl LifecycleSynchronizer {
    pub fn new(
        ctx: ModuleContext,
        system: Arc<dyn SystemAccess>,
        store: Arc<AggregationStore>,
    ) -> Self {
        Self { ctx, system, store }
    }

    /// Starts modules that should run and are not alive, stops modules that
    /// are alive and should not run. Stopping purges the module's store and
    /// schedule entries.
    pub fn synchronize(
        &self,
        registry: &mut Registry,
        schedule: &mut ScheduleState,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        for module in registry.iter_mut() {
            let key = module.key();
            let should_run = self
                .ctx
                .config
                .is_module_enabled(key, module.default_enabled());

            if should_run && !module.alive() {
                module.start(&self.ctx, Arc::clone(&self.system));
                schedule.seed(key);
                info!(module = key, "Module started");
                outcome.started.push(key);
            } else if !should_run && module.alive() {
                module.stop();
                self.store.remove(key);
                schedule.remove(key);
                info!(module = key, "Module stopped");
                outcome.stopped.push(key);
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::module::DataPoints;
    use crate::monitor::testing::{FakeModule, Harness, MemoryConfig};

    fn setup() -> (Arc<MemoryConfig>, LifecycleSynchronizer, Arc<AggregationStore>) {
        let harness = Harness::new();
        let store = Arc::new(AggregationStore::new());
        let sync = LifecycleSynchronizer::new(
            harness.ctx.clone(),
            harness.system(),
            Arc::clone(&store),
        );
        (harness.config, sync, store)
    }

    #[test]
    fn test_due_checks() {
        let mut schedule = ScheduleState::new();
        assert!(schedule.is_due("a", 0, 3000));

        schedule.seed("a");
        assert!(schedule.is_due("a", 0, 3000));
        assert_eq!(schedule.next_due("a", 500, 3000), 500);

        schedule.record("a", 1000);
        assert!(!schedule.is_due("a", 3999, 3000));
        assert!(schedule.is_due("a", 4000, 3000));
        assert_eq!(schedule.next_due("a", 2000, 3000), 4000);

        schedule.force_due_all();
        assert_eq!(schedule.get("a"), Some(LastTick::Pending));
    }

    #[test]
    fn test_starts_enabled_modules_with_default() {
        let (_config, sync, _store) = setup();
        let mut registry = Registry::new(vec![
            Box::new(FakeModule::new("on", 1000)),
            Box::new(FakeModule::new("off", 1000).disabled_by_default()),
        ])
        .unwrap();
        let mut schedule = ScheduleState::new();

        let outcome = sync.synchronize(&mut registry, &mut schedule);

        assert_eq!(outcome.started, vec!["on"]);
        assert!(outcome.stopped.is_empty());
        assert!(registry.get("on").unwrap().alive());
        assert!(!registry.get("off").unwrap().alive());
        assert_eq!(schedule.get("on"), Some(LastTick::Pending));
        assert!(!schedule.contains("off"));
    }

    #[test]
    fn test_disabling_purges_store_and_schedule() {
        let (config, sync, store) = setup();
        let mut registry = Registry::new(vec![Box::new(FakeModule::new("a", 1000))]).unwrap();
        let mut schedule = ScheduleState::new();

        sync.synchronize(&mut registry, &mut schedule);
        schedule.record("a", 10);
        store.put("a", DataPoints::new());

        config.set_enabled("a", false);
        let outcome = sync.synchronize(&mut registry, &mut schedule);

        assert_eq!(outcome.stopped, vec!["a"]);
        assert!(!registry.get("a").unwrap().alive());
        assert!(!store.contains("a"));
        assert!(!schedule.contains("a"));
    }

    #[test]
    fn test_steady_state_is_noop() {
        let (_config, sync, _store) = setup();
        let mut registry = Registry::new(vec![Box::new(FakeModule::new("a", 1000))]).unwrap();
        let mut schedule = ScheduleState::new();

        sync.synchronize(&mut registry, &mut schedule);
        schedule.record("a", 42);

        let outcome = sync.synchronize(&mut registry, &mut schedule);
        assert!(outcome.is_empty());
        assert_eq!(schedule.get("a"), Some(LastTick::At(42)));
    }
}
