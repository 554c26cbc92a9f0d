//! Adaptive, self-rescheduling tick loop.
//!
//! The scheduler wakes only when some module is due. Each wake runs one
//! cycle: reconcile lifecycle, tick due modules, store their data points,
//! republish the report if anything ticked. The next wake is the earliest
//! module due time, clamped to `[MIN_DELAY_MS, MAX_DELAY_MS]`, or
//! `IDLE_DELAY_MS` when nothing is alive so configuration changes are still
//! noticed.
//!
//! The scheduler itself holds no timer. The owner sleeps until
//! [`TickScheduler::next_wake`] and calls [`TickScheduler::fire`]; see the
//! daemon's event loop.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use ebox_platform::SystemAccess;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::monitor::context::ModuleContext;
use crate::monitor::lifecycle::{LifecycleSynchronizer, ScheduleState};
use crate::monitor::module::{Module, ModuleError};
use crate::monitor::registry::Registry;
use crate::monitor::report::ReportBuilder;
use crate::monitor::store::AggregationStore;

pub const MIN_DELAY_MS: u64 = 1_000;
pub const MAX_DELAY_MS: u64 = 60_000;
pub const IDLE_DELAY_MS: u64 = 5_000;

/// Delay until the earliest of `next_due` (monotonic ms), clamped. With no
/// candidates the idle delay applies.
pub fn compute_delay_ms(now_ms: u64, next_due: impl IntoIterator<Item = u64>) -> u64 {
    next_due
        .into_iter()
        .map(|due| due.saturating_sub(now_ms))
        .min()
        .map(|delay| delay.clamp(MIN_DELAY_MS, MAX_DELAY_MS))
        .unwrap_or(IDLE_DELAY_MS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Active,
}

#[derive(Debug, Default)]
pub struct CycleOutcome {
    pub ticked: Vec<&'static str>,
    pub faulted: Vec<&'static str>,
    pub published: bool,
}

pub struct TickScheduler {
    registry: Registry,
    schedule: ScheduleState,
    store: Arc<AggregationStore>,
    synchronizer: LifecycleSynchronizer,
    ctx: ModuleContext,
    next_wake: Option<Instant>,
    cycle_count: u64,
    last_cycle_at: Option<i64>,
}

impl TickScheduler {
    pub fn new(
        registry: Registry,
        ctx: ModuleContext,
        system: Arc<dyn SystemAccess>,
        store: Arc<AggregationStore>,
    ) -> Self {
        let synchronizer = LifecycleSynchronizer::new(ctx.clone(), system, Arc::clone(&store));
        Self {
            registry,
            schedule: ScheduleState::new(),
            store,
            synchronizer,
            ctx,
            next_wake: None,
            cycle_count: 0,
            last_cycle_at: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.next_wake.is_some() {
            SchedulerState::Active
        } else {
            SchedulerState::Idle
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<AggregationStore> {
        &self.store
    }

    #[cfg(test)]
    pub fn schedule(&self) -> &ScheduleState {
        &self.schedule
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Unix time of the last completed cycle.
    pub fn last_cycle_at(&self) -> Option<i64> {
        self.last_cycle_at
    }

    /// Pending wake, `None` while idle.
    pub fn next_wake(&self) -> Option<Instant> {
        self.next_wake
    }

    /// Idle → Active. Runs an eager cycle with every enabled module due.
    pub fn start(&mut self) -> CycleOutcome {
        if self.state() == SchedulerState::Active {
            return CycleOutcome::default();
        }

        info!(modules = self.registry.len(), "Scheduler starting");
        self.ctx.config.set_running(true);
        let outcome = self.run_cycle(true);
        self.reschedule();
        outcome
    }

    /// Active → Active. Runs one cycle and schedules the next wake. Does
    /// nothing while idle.
    pub fn fire(&mut self) -> CycleOutcome {
        if self.state() == SchedulerState::Idle {
            return CycleOutcome::default();
        }

        let outcome = self.run_cycle(false);
        self.reschedule();
        outcome
    }

    /// Active → Idle. Cancels the pending wake, stops every alive module and
    /// clears the store and schedule.
    pub fn stop(&mut self) {
        self.next_wake = None;

        for module in self.registry.iter_mut() {
            if module.alive() {
                module.stop();
            }
        }
        self.store.clear();
        self.schedule.clear();
        self.ctx.config.set_running(false);

        info!(cycles = self.cycle_count, "Scheduler stopped");
    }

    pub fn next_delay(&self) -> Duration {
        let now = self.ctx.clock.now_ms();
        let due_times = self
            .registry
            .iter()
            .filter(|m| m.alive())
            .map(|m| self.schedule.next_due(m.key(), now, m.tick_interval_ms()));
        Duration::from_millis(compute_delay_ms(now, due_times))
    }

    fn reschedule(&mut self) {
        let delay = self.next_delay();
        debug!(delay_ms = delay.as_millis() as u64, "Next wake scheduled");
        self.next_wake = Some(Instant::now() + delay);
    }

    fn run_cycle(&mut self, force_due: bool) -> CycleOutcome {
        self.ctx.config.refresh();
        self.synchronizer
            .synchronize(&mut self.registry, &mut self.schedule);
        if force_due {
            self.schedule.force_due_all();
        }

        let now = self.ctx.clock.now_ms();
        let mut outcome = CycleOutcome::default();

        for module in self.registry.iter_mut() {
            if !module.alive() {
                continue;
            }
            let key = module.key();
            if !self.schedule.is_due(key, now, module.tick_interval_ms()) {
                continue;
            }

            if let Err(e) = tick_isolated(module, &self.ctx) {
                warn!(module = key, error = %e, "Module fault during tick");
                outcome.faulted.push(key);
            }
            self.schedule.record(key, now);
            self.store.put(key, module.data_points());
            outcome.ticked.push(key);
        }

        if !outcome.ticked.is_empty() {
            let report = ReportBuilder::new(&self.registry).build();
            match self.ctx.notifier.publish(&report) {
                Ok(()) => outcome.published = true,
                Err(e) => debug!(error = %e, "Report publish failed"),
            }
        }

        self.cycle_count += 1;
        self.last_cycle_at = Some(chrono::Utc::now().timestamp());
        debug!(
            cycle = self.cycle_count,
            alive = self.registry.alive_count(),
            ticked = outcome.ticked.len(),
            faulted = outcome.faulted.len(),
            published = outcome.published,
            "Cycle complete"
        );

        outcome
    }
}

/// Runs `tick` then `check_alerts`, turning panics into `ModuleError`.
fn tick_isolated(module: &mut dyn Module, ctx: &ModuleContext) -> Result<(), ModuleError> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        module.tick()?;
        module.check_alerts(ctx)
    }))
    .unwrap_or_else(|payload| Err(ModuleError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
