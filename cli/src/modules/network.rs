use std::sync::Arc;

use ebox_platform::{NetworkTotals, SystemAccess};
use tracing::debug;

use crate::monitor::format;
use crate::monitor::{DataPoints, Module, ModuleContext, ModuleError};

const DEFAULT_INTERVAL_MS: u64 = 3_000;

/// Download and upload rate derived from cumulative rx/tx totals.
#[derive(Default)]
pub struct NetworkModule {
    ctx: Option<ModuleContext>,
    system: Option<Arc<dyn SystemAccess>>,
    prev: Option<NetworkTotals>,
    prev_ms: u64,
    download: u64,
    upload: u64,
}

impl NetworkModule {
    pub fn new() -> Self {
        Self::default()
    }

    fn rate(now: u64, prev: u64, dt_ms: u64) -> u64 {
        now.saturating_sub(prev).saturating_mul(1000) / dt_ms
    }
}

impl Module for NetworkModule {
    fn key(&self) -> &'static str {
        "network"
    }

    fn name(&self) -> &'static str {
        "Network Speed"
    }

    fn description(&self) -> &'static str {
        "Real-time download and upload speed"
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
            .map(|ctx| ctx.interval_ms("net_interval", DEFAULT_INTERVAL_MS))
            .unwrap_or(DEFAULT_INTERVAL_MS)
    }

    fn start(&mut self, ctx: &ModuleContext, system: Arc<dyn SystemAccess>) {
        self.prev = system.network_totals().ok();
        self.prev_ms = ctx.clock.now_ms();
        self.download = 0;
        self.upload = 0;
        self.system = Some(system);
        self.ctx = Some(ctx.clone());
    }

    fn stop(&mut self) {
        self.ctx = None;
        self.system = None;
        self.prev = None;
        self.download = 0;
        self.upload = 0;
    }

    fn tick(&mut self) -> Result<(), ModuleError> {
        let (Some(ctx), Some(system)) = (&self.ctx, &self.system) else {
            return Err(ModuleError::NotStarted);
        };

        let totals = match system.network_totals() {
            Ok(totals) => totals,
            Err(e) => {
                debug!(error = %e, "Network counters unavailable");
                self.download = 0;
                self.upload = 0;
                return Ok(());
            }
        };

        let now_ms = ctx.clock.now_ms();
        let dt_ms = now_ms.saturating_sub(self.prev_ms);
        if let Some(prev) = self.prev {
            if dt_ms > 0 {
                self.download = Self::rate(totals.rx_bytes, prev.rx_bytes, dt_ms);
                self.upload = Self::rate(totals.tx_bytes, prev.tx_bytes, dt_ms);
            }
        }

        self.prev = Some(totals);
        self.prev_ms = now_ms;
        Ok(())
    }

    fn check_alerts(&mut self, _ctx: &ModuleContext) -> Result<(), ModuleError> {
        Ok(())
    }

    fn data_points(&self) -> DataPoints {
        let mut points = DataPoints::new();
        points.insert("net.download", format::speed(self.download));
        points.insert("net.upload", format::speed(self.upload));
        points
    }

    fn compact(&self) -> String {
        format!(
            "↓{} ↑{}",
            format::speed(self.download),
            format::speed(self.upload)
        )
    }

    fn detail(&self) -> String {
        format!(
            "📶 Download: {}\n   Upload: {}",
            format::speed(self.download),
            format::speed(self.upload)
        )
    }
}
