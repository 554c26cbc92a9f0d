use std::sync::Arc;

use chrono::{Local, NaiveDate};
use ebox_platform::SystemAccess;
use tracing::{debug, info};

use crate::monitor::{DataPoints, Module, ModuleContext, ModuleError};

const DEFAULT_INTERVAL_MS: u64 = 5_000;

/// Unlocks per day. 0 disables the alert.
const DEFAULT_LIMIT: i64 = 0;

/// Counts unlocks since local midnight from a session-wide counter.
#[derive(Default)]
pub struct UnlockModule {
    ctx: Option<ModuleContext>,
    system: Option<Arc<dyn SystemAccess>>,
    day: Option<NaiveDate>,
    baseline: u64,
    today: u64,
    limit_alerted: bool,
}

impl UnlockModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlocks since local midnight.
    pub fn today(&self) -> u64 {
        self.today
    }

    fn total(&self) -> Option<u64> {
        let system = self.system.as_ref()?;
        match system.unlock_total() {
            Ok(total) => Some(total),
            Err(e) => {
                debug!(error = %e, "Unlock counter unavailable");
                None
            }
        }
    }

    /// Updates today's count for `date`, re-baselining when the day changed.
    fn tick_on(&mut self, date: NaiveDate) -> Result<(), ModuleError> {
        if self.system.is_none() {
            return Err(ModuleError::NotStarted);
        }
        let Some(total) = self.total() else {
            return Ok(());
        };

        if self.day != Some(date) {
            if self.day.is_some() {
                info!(previous = self.today, "Unlock count reset for new day");
            }
            self.day = Some(date);
            self.baseline = total;
            self.limit_alerted = false;
        }

        // The counter never decreases, but a restarted source could reset it.
        if total < self.baseline {
            self.baseline = total;
        }
        self.today = total - self.baseline;
        Ok(())
    }

    fn limit(&self) -> i64 {
        self.ctx
            .as_ref()
            .map(|ctx| ctx.config.get_int("unlock_limit", DEFAULT_LIMIT))
            .unwrap_or(DEFAULT_LIMIT)
    }
}

impl Module for UnlockModule {
    fn key(&self) -> &'static str {
        "unlock"
    }

    fn name(&self) -> &'static str {
        "Unlock Counter"
    }

    fn description(&self) -> &'static str {
        "Counts screen unlocks today"
    }

    fn default_enabled(&self) -> bool {
        true
    }

    fn alive(&self) -> bool {
        self.ctx.is_some()
    }

    fn tick_interval_ms(&self) -> u64 {
        self.ctx
            .as_ref()
            .map(|ctx| ctx.interval_ms("unlock_interval", DEFAULT_INTERVAL_MS))
            .unwrap_or(DEFAULT_INTERVAL_MS)
    }

    fn start(&mut self, ctx: &ModuleContext, system: Arc<dyn SystemAccess>) {
        self.ctx = Some(ctx.clone());
        self.system = Some(system);
        self.baseline = self.total().unwrap_or(0);
        self.day = Some(Local::now().date_naive());
        self.today = 0;
        self.limit_alerted = false;
    }

    fn stop(&mut self) {
        self.ctx = None;
        self.system = None;
        self.day = None;
        self.today = 0;
    }

    fn tick(&mut self) -> Result<(), ModuleError> {
        self.tick_on(Local::now().date_naive())
    }

    fn check_alerts(&mut self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        let limit = self.limit();
        if limit <= 0 || self.limit_alerted || self.today < limit as u64 {
            return Ok(());
        }

        ctx.notifier.publish_alert(
            self.key(),
            &format!("Unlock limit reached: {} today", self.today),
        )?;
        self.limit_alerted = true;
        Ok(())
    }

    fn data_points(&self) -> DataPoints {
        let mut points = DataPoints::new();
        points.insert("unlock.today", self.today().to_string());
        let limit = self.limit();
        if limit > 0 {
            points.insert("unlock.limit", limit.to_string());
        }
        points
    }

    fn compact(&self) -> String {
        format!("🔓{}", self.today())
    }

    fn detail(&self) -> String {
        match self.limit() {
            limit if limit > 0 => format!("🔓 Unlocks today: {} / {}", self.today, limit),
            _ => format!("🔓 Unlocks today: {}", self.today),
        }
    }
}
