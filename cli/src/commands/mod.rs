pub mod config;
pub mod daemon;
pub mod data;
pub mod logs;
pub mod modules;
pub mod run;
pub mod status;
pub mod unlock;

use color_eyre::eyre::{bail, Result};

use crate::daemon::{is_daemon_running, DaemonClient};

/// Connects to a compatible daemon or explains how to start one.
fn connect() -> Result<DaemonClient> {
    if !is_daemon_running() {
        bail!("Daemon is not running. Start it with: ebox daemon start");
    }
    Ok(DaemonClient::connect_checked()?)
}

fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}
