//! Battery readings through `starship-battery`.

use starship_battery::units::ratio::percent;
use starship_battery::units::thermodynamic_temperature::degree_celsius;
use starship_battery::Manager;

use crate::error::{PlatformError, Result};
use crate::types::ChargeState;

/// Battery state at the time of the read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatteryReading {
    /// Charge level as a percentage (0-100).
    pub level_percent: f32,

    /// Current charging state.
    pub state: ChargeState,

    /// Battery temperature in Celsius, if the hardware reports it.
    pub temperature_c: Option<f32>,

    /// Full-charge capacity relative to design capacity (0-100).
    pub health_percent: f32,
}

impl BatteryReading {
    /// Level rounded to a whole percent, clamped to 0..=100.
    pub fn level(&self) -> u8 {
        self.level_percent.round().clamp(0.0, 100.0) as u8
    }
}

/// Reads the first battery the system reports.
///
/// The manager is created per call; on Linux and macOS this is a handful of
/// sysfs or IOKit lookups and never blocks.
pub(crate) fn read_first_battery() -> Result<BatteryReading> {
    let manager = Manager::new()?;
    let battery = manager
        .batteries()?
        .next()
        .ok_or(PlatformError::NoBattery)??;

    Ok(BatteryReading {
        level_percent: battery.state_of_charge().get::<percent>(),
        state: ChargeState::from(battery.state()),
        temperature_c: battery.temperature().map(|t| t.get::<degree_celsius>()),
        health_percent: battery.state_of_health().get::<percent>(),
    })
}
