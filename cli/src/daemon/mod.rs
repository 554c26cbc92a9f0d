mod client;
mod server;

pub use client::DaemonClient;
pub use server::{build_scheduler, run_daemon};

pub(crate) use server::to_module_data;

use std::path::PathBuf;

use crate::config::runtime_dir;

const SOCKET_NAME: &str = "ebox.sock";

pub fn socket_path() -> PathBuf {
    runtime_dir().join(SOCKET_NAME)
}

pub fn is_daemon_running() -> bool {
    DaemonClient::connect().is_ok()
}
