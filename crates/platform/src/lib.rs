//! Raw OS counters for the ebox monitor.
//!
//! This crate is the only place that talks to the operating system. Monitor
//! modules receive a [`SystemAccess`] handle when they start and read their
//! counters through it; they never see which backend produced a value.
//!
//! Every reading is cheap and non-blocking. When a counter cannot be read the
//! call returns [`PlatformError`] and the caller degrades to a neutral value.
//!
//! # Example
//!
//! ```ignore
//! use ebox_platform::{HostSystem, SystemAccess};
//!
//! let system = HostSystem::new();
//! let totals = system.network_totals()?;
//! println!("rx={} tx={}", totals.rx_bytes, totals.tx_bytes);
//! ```

mod access;
mod battery;
mod error;
mod network;
mod types;
mod unlock;

pub use access::{HostSystem, SystemAccess};
pub use battery::BatteryReading;
pub use error::PlatformError;
pub use network::NetworkTotals;
pub use types::ChargeState;
pub use unlock::UnlockCounter;
