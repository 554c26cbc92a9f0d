//! Test doubles for the monitor: in-memory config, manual clock, recording
//! notifier, scripted system counters and a configurable fake module.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use ebox_platform::{BatteryReading, NetworkTotals, PlatformError, SystemAccess};

use crate::monitor::context::{Clock, Configuration, ModuleContext};
use crate::monitor::module::{DataPoints, Module, ModuleError};
use crate::monitor::notifier::{Notifier, NotifyError};
use crate::monitor::report::Report;

#[derive(Default)]
pub struct MemoryConfig {
    enabled: RwLock<HashMap<String, bool>>,
    ints: RwLock<HashMap<String, i64>>,
    running: AtomicBool,
    refreshes: AtomicU64,
}

impl MemoryConfig {
    pub fn set_enabled(&self, key: &str, enabled: bool) {
        self.enabled
            .write()
            .unwrap()
            .insert(key.to_string(), enabled);
    }

    pub fn set_int(&self, key: &str, value: i64) {
        self.ints.write().unwrap().insert(key.to_string(), value);
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl Configuration for MemoryConfig {
    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }

    fn is_module_enabled(&self, key: &str, default: bool) -> bool {
        self.enabled
            .read()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(default)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.ints
            .read()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(default)
    }
}

#[derive(Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    reports: Mutex<Vec<Report>>,
    alerts: Mutex<Vec<(String, String)>>,
    reject: AtomicBool,
}

impl RecordingNotifier {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<(String, String)> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn reject_publishes(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }
}

impl Notifier for RecordingNotifier {
    fn publish(&self, report: &Report) -> Result<(), NotifyError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("surface unavailable").into());
        }
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }

    fn publish_alert(&self, module_key: &str, message: &str) -> Result<(), NotifyError> {
        self.alerts
            .lock()
            .unwrap()
            .push((module_key.to_string(), message.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSystem {
    pub battery: Mutex<Option<BatteryReading>>,
    pub network: Mutex<Option<NetworkTotals>>,
    pub unlocks: AtomicU64,
}

impl SystemAccess for FakeSystem {
    fn battery(&self) -> Result<BatteryReading, PlatformError> {
        self.battery
            .lock()
            .unwrap()
            .clone()
            .ok_or(PlatformError::NoBattery)
    }

    fn network_totals(&self) -> Result<NetworkTotals, PlatformError> {
        self.network
            .lock()
            .unwrap()
            .ok_or(PlatformError::Unsupported("network"))
    }

    fn unlock_total(&self) -> Result<u64, PlatformError> {
        Ok(self.unlocks.load(Ordering::SeqCst))
    }
}

pub struct Harness {
    pub config: Arc<MemoryConfig>,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub system: Arc<FakeSystem>,
    pub ctx: ModuleContext,
}

impl Harness {
    pub fn new() -> Self {
        let config = Arc::new(MemoryConfig::default());
        let clock = Arc::new(ManualClock::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = ModuleContext::new(
            Arc::clone(&config) as Arc<dyn Configuration>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        Self {
            config,
            clock,
            notifier,
            system: Arc::new(FakeSystem::default()),
            ctx,
        }
    }

    pub fn system(&self) -> Arc<dyn SystemAccess> {
        Arc::clone(&self.system) as Arc<dyn SystemAccess>
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBehavior {
    Normal,
    FailTick,
    PanicTick,
    PanicAlerts,
}

/// Counters observable after the module is boxed into a registry.
#[derive(Default)]
pub struct FakeProbe {
    pub tick_times: Mutex<Vec<u64>>,
    pub starts: AtomicU64,
    pub stops: AtomicU64,
}

impl FakeProbe {
    pub fn ticks(&self) -> usize {
        self.tick_times.lock().unwrap().len()
    }

    pub fn tick_times(&self) -> Vec<u64> {
        self.tick_times.lock().unwrap().clone()
    }
}

pub struct FakeModule {
    key: &'static str,
    interval_ms: u64,
    default_enabled: bool,
    behavior: FakeBehavior,
    compact: String,
    headline: Option<String>,
    alive: bool,
    clock: Option<Arc<dyn Clock>>,
    probe: Arc<FakeProbe>,
}

impl FakeModule {
    pub fn new(key: &'static str, interval_ms: u64) -> Self {
        Self {
            key,
            interval_ms,
            default_enabled: true,
            behavior: FakeBehavior::Normal,
            compact: key.to_string(),
            headline: None,
            alive: false,
            clock: None,
            probe: Arc::new(FakeProbe::default()),
        }
    }

    pub fn disabled_by_default(mut self) -> Self {
        self.default_enabled = false;
        self
    }

    pub fn with_behavior(mut self, behavior: FakeBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_compact(mut self, compact: &str) -> Self {
        self.compact = compact.to_string();
        self
    }

    pub fn with_headline(mut self, headline: &str) -> Self {
        self.headline = Some(headline.to_string());
        self
    }

    pub fn probe(&self) -> Arc<FakeProbe> {
        Arc::clone(&self.probe)
    }
}

impl Module for FakeModule {
    fn key(&self) -> &'static str {
        self.key
    }

    fn name(&self) -> &'static str {
        "Fake"
    }

    fn description(&self) -> &'static str {
        "Test module"
    }

    fn default_enabled(&self) -> bool {
        self.default_enabled
    }

    fn alive(&self) -> bool {
        self.alive
    }

    fn tick_interval_ms(&self) -> u64 {
        self.interval_ms
    }

    fn start(&mut self, ctx: &ModuleContext, _system: Arc<dyn SystemAccess>) {
        assert!(!self.alive, "start called on alive module {}", self.key);
        self.clock = Some(Arc::clone(&ctx.clock));
        self.alive = true;
        self.probe.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        self.alive = false;
        self.clock = None;
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn tick(&mut self) -> Result<(), ModuleError> {
        let now = self.clock.as_ref().map(|c| c.now_ms()).unwrap_or(0);
        self.probe.tick_times.lock().unwrap().push(now);
        match self.behavior {
            FakeBehavior::FailTick => Err(ModuleError::NotStarted),
            FakeBehavior::PanicTick => panic!("tick exploded"),
            _ => Ok(()),
        }
    }

    fn check_alerts(&mut self, _ctx: &ModuleContext) -> Result<(), ModuleError> {
        if self.behavior == FakeBehavior::PanicAlerts {
            panic!("alerts exploded");
        }
        Ok(())
    }

    fn data_points(&self) -> DataPoints {
        let mut points = DataPoints::new();
        points.insert("ticks", self.probe.ticks().to_string());
        points
    }

    fn compact(&self) -> String {
        self.compact.clone()
    }

    fn detail(&self) -> String {
        if self.compact.is_empty() {
            String::new()
        } else {
            format!("{} detail", self.compact)
        }
    }

    fn headline(&self) -> Option<String> {
        self.headline.clone()
    }
}
