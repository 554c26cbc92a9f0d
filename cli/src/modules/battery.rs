use std::sync::Arc;

use ebox_platform::{BatteryReading, SystemAccess};
use tracing::debug;

use crate::monitor::format;
use crate::monitor::{DataPoints, Module, ModuleContext, ModuleError};

const DEFAULT_INTERVAL_MS: u64 = 10_000;
const DEFAULT_LOW_ALERT: i64 = 15;
const DEFAULT_TEMP_ALERT: i64 = 45;

/// Degrees below the hot threshold before the hot alert re-arms.
const TEMP_HYSTERESIS: f32 = 2.0;

const UNKNOWN: &str = "N/A";

/// Level, charge state, temperature and health of the first battery.
#[derive(Default)]
pub struct BatteryModule {
    ctx: Option<ModuleContext>,
    system: Option<Arc<dyn SystemAccess>>,
    reading: Option<BatteryReading>,
    low_alerted: bool,
    hot_alerted: bool,
}

impl BatteryModule {
    pub fn new() -> Self {
        Self::default()
    }

    fn level_text(&self) -> String {
        self.reading
            .as_ref()
            .map(|r| format!("{}%", r.level()))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn temp_text(&self) -> String {
        self.reading
            .as_ref()
            .and_then(|r| r.temperature_c)
            .map(format::celsius)
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn check_low(
        &mut self,
        ctx: &ModuleContext,
        reading: &BatteryReading,
    ) -> Result<(), ModuleError> {
        let threshold = ctx.config.get_int("bat_low_alert", DEFAULT_LOW_ALERT);
        if threshold <= 0 {
            return Ok(());
        }

        let level = i64::from(reading.level());
        if level > threshold {
            self.low_alerted = false;
        } else if reading.state.is_discharging() && !self.low_alerted {
            ctx.notifier
                .publish_alert(self.key(), &format!("Battery low: {}%", level))?;
            self.low_alerted = true;
        }
        Ok(())
    }

    fn check_hot(
        &mut self,
        ctx: &ModuleContext,
        reading: &BatteryReading,
    ) -> Result<(), ModuleError> {
        let threshold = ctx.config.get_int("bat_temp_alert", DEFAULT_TEMP_ALERT);
        let Some(temp) = reading.temperature_c else {
            return Ok(());
        };
        if threshold <= 0 {
            return Ok(());
        }

        let threshold = threshold as f32;
        if temp < threshold - TEMP_HYSTERESIS {
            self.hot_alerted = false;
        } else if temp >= threshold && !self.hot_alerted {
            ctx.notifier.publish_alert(
                self.key(),
                &format!("Battery hot: {}", format::celsius(temp)),
            )?;
            self.hot_alerted = true;
        }
        Ok(())
    }
}

impl Module for BatteryModule {
    fn key(&self) -> &'static str {
        "battery"
    }

    fn name(&self) -> &'static str {
        "Battery"
    }

    fn description(&self) -> &'static str {
        "Level, charge state, temperature and health"
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
            .map(|ctx| ctx.interval_ms("bat_interval", DEFAULT_INTERVAL_MS))
            .unwrap_or(DEFAULT_INTERVAL_MS)
    }

    fn start(&mut self, ctx: &ModuleContext, system: Arc<dyn SystemAccess>) {
        self.ctx = Some(ctx.clone());
        self.system = Some(system);
        self.reading = None;
        self.low_alerted = false;
        self.hot_alerted = false;
    }

    fn stop(&mut self) {
        self.ctx = None;
        self.system = None;
        self.reading = None;
    }

    fn tick(&mut self) -> Result<(), ModuleError> {
        let system = self.system.as_ref().ok_or(ModuleError::NotStarted)?;
        self.reading = match system.battery() {
            Ok(reading) => Some(reading),
            Err(e) => {
                debug!(error = %e, "Battery unavailable");
                None
            }
        };
        Ok(())
    }

    fn check_alerts(&mut self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        let Some(reading) = self.reading.clone() else {
            return Ok(());
        };
        self.check_low(ctx, &reading)?;
        self.check_hot(ctx, &reading)
    }

    fn data_points(&self) -> DataPoints {
        let mut points = DataPoints::new();
        points.insert("bat.level", self.level_text());
        points.insert(
            "bat.state",
            self.reading
                .as_ref()
                .map(|r| r.state.label())
                .unwrap_or(UNKNOWN),
        );
        points.insert("bat.temp", self.temp_text());
        points.insert(
            "bat.health",
            self.reading
                .as_ref()
                .map(|r| format!("{:.0}%", r.health_percent))
                .unwrap_or_else(|| UNKNOWN.to_string()),
        );
        points
    }

    fn compact(&self) -> String {
        let charging = self
            .reading
            .as_ref()
            .is_some_and(|r| r.state.is_charging());
        format!("🔋{}{}", self.level_text(), if charging { "⚡" } else { "" })
    }

    fn detail(&self) -> String {
        match &self.reading {
            Some(reading) => format!(
                "🔋 Battery: {}% ({})\n   Temp: {} • Health: {:.0}%",
                reading.level(),
                reading.state,
                self.temp_text(),
                reading.health_percent
            ),
            None => format!("🔋 Battery: {}", UNKNOWN),
        }
    }

    fn headline(&self) -> Option<String> {
        self.reading.as_ref().map(|r| format!("{}%", r.level()))
    }
}
