use std::time::Duration;

use color_eyre::eyre::Result;

use crate::cli::DaemonCommands;
use crate::config::LogLevel;
use crate::daemon::{is_daemon_running, run_daemon, socket_path, DaemonClient};
use crate::logging::{self, LogMode};
use crate::monitor::{format, Configuration};
use crate::prefs::Prefs;

use super::format_timestamp;

pub fn run(
    command: DaemonCommands,
    log_level: LogLevel,
    log_level_override: Option<LogLevel>,
) -> Result<()> {
    match command {
        DaemonCommands::Start { foreground } => start(foreground, log_level, log_level_override),
        DaemonCommands::Stop => stop(),
        DaemonCommands::Status => status(),
    }
}

fn start(
    foreground: bool,
    log_level: LogLevel,
    log_level_override: Option<LogLevel>,
) -> Result<()> {
    if is_daemon_running() {
        println!("Daemon is already running.");
        return Ok(());
    }

    if foreground {
        let _guard = logging::init(log_level, LogMode::Both, log_level_override);
        println!("Starting daemon in foreground...");
        println!("Press Ctrl+C to stop.");
        run_daemon(true, log_level, log_level_override)?;
        return Ok(());
    }

    println!("Starting daemon...");
    run_daemon(false, log_level, log_level_override)?;
    std::thread::sleep(Duration::from_millis(500));

    let started = (0..3).any(|_| {
        let up = is_daemon_running();
        if !up {
            std::thread::sleep(Duration::from_millis(200));
        }
        up
    });

    if started {
        println!("Daemon started successfully.");
        println!("Socket: {:?}", socket_path());
    } else {
        println!("Daemon may have failed to start. Check logs:");
        println!("  ebox logs");
    }
    Ok(())
}

fn stop() -> Result<()> {
    if !is_daemon_running() {
        println!("Daemon is not running.");
        return Ok(());
    }

    DaemonClient::connect()?.shutdown()?;
    println!("Daemon stopped.");
    Ok(())
}

fn status() -> Result<()> {
    println!("Daemon Status");
    println!("{}", "-".repeat(40));

    if !is_daemon_running() {
        println!("Running:      no");
        if Prefs::load_default().is_running() {
            println!("Note:         last run did not shut down cleanly");
        }
        return Ok(());
    }

    let status = DaemonClient::connect_checked()?.get_status()?;
    println!("Running:      yes");
    println!("Monitoring:   {}", if status.running { "active" } else { "idle" });
    println!("Version:      {}", status.version);
    println!("Protocol:     v{}", status.protocol_version);
    println!("Uptime:       {}", format::duration(status.uptime_secs));
    println!("Cycles:       {}", status.cycle_count);
    if let Some(last) = status.last_cycle_time {
        println!("Last cycle:   {}", format_timestamp(last));
    }

    println!();
    println!("Modules");
    println!("{}", "-".repeat(40));
    for module in &status.modules {
        println!(
            "{:<10} {:<6} every {}",
            module.key,
            if module.alive { "alive" } else { "off" },
            format::duration(module.interval_ms / 1000)
        );
    }
    Ok(())
}
