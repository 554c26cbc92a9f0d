//! The capability handle modules read their counters through.

use crate::battery::{read_first_battery, BatteryReading};
use crate::error::Result;
use crate::network::{NetworkCounters, NetworkTotals};
use crate::unlock::UnlockCounter;

/// Access to raw OS counters.
///
/// Implementations must answer without blocking: every method is called from
/// the scheduler's single execution context.
pub trait SystemAccess: Send + Sync {
    /// Current battery state.
    fn battery(&self) -> Result<BatteryReading>;

    /// Cumulative rx/tx byte totals.
    fn network_totals(&self) -> Result<NetworkTotals>;

    /// Total unlock events observed since the process started.
    fn unlock_total(&self) -> Result<u64>;
}

/// The real host: battery via `starship-battery`, network via `sysinfo`,
/// unlocks via an externally fed [`UnlockCounter`].
pub struct HostSystem {
    network: NetworkCounters,
    unlocks: UnlockCounter,
}

impl HostSystem {
    pub fn new() -> Self {
        Self {
            network: NetworkCounters::new(),
            unlocks: UnlockCounter::new(),
        }
    }

    /// Counter that external unlock notifications are recorded into.
    pub fn unlocks(&self) -> &UnlockCounter {
        &self.unlocks
    }
}

impl Default for HostSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemAccess for HostSystem {
    fn battery(&self) -> Result<BatteryReading> {
        read_first_battery()
    }

    fn network_totals(&self) -> Result<NetworkTotals> {
        self.network.totals()
    }

    fn unlock_total(&self) -> Result<u64> {
        Ok(self.unlocks.total())
    }
}
