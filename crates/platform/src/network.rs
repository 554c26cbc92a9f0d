//! Cumulative network byte counters through `sysinfo`.

use std::sync::Mutex;

use sysinfo::Networks;

use crate::error::{PlatformError, Result};

/// Total bytes moved across all non-loopback interfaces since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkTotals {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

pub(crate) struct NetworkCounters {
    networks: Mutex<Networks>,
}

impl NetworkCounters {
    pub fn new() -> Self {
        Self {
            networks: Mutex::new(Networks::new_with_refreshed_list()),
        }
    }

    pub fn totals(&self) -> Result<NetworkTotals> {
        let mut networks = self
            .networks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        networks.refresh(true);

        let mut seen_any = false;
        let mut totals = NetworkTotals::default();
        for (name, data) in networks.iter() {
            if is_loopback(name) {
                continue;
            }
            seen_any = true;
            totals.rx_bytes = totals.rx_bytes.saturating_add(data.total_received());
            totals.tx_bytes = totals.tx_bytes.saturating_add(data.total_transmitted());
        }

        if !seen_any {
            return Err(PlatformError::Unsupported("network"));
        }
        Ok(totals)
    }
}

fn is_loopback(name: &str) -> bool {
    name == "lo" || name.starts_with("lo0")
}
