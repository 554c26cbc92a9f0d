use std::sync::Arc;

use color_eyre::eyre::Result;
use ebox_platform::{HostSystem, SystemAccess};
use tracing::info;

use crate::config::UserConfig;
use crate::daemon::{build_scheduler, to_module_data};
use crate::monitor::StatusBoard;
use crate::prefs::Prefs;

/// Runs the monitor in-process, echoing every report to stdout until
/// interrupted. With `once`, the config file is read but never written.
pub fn run(once: bool) -> Result<()> {
    let prefs = if once {
        Prefs::in_memory(UserConfig::load())
    } else {
        Prefs::load_default()
    };
    let prefs = Arc::new(prefs);
    let board = Arc::new(StatusBoard::new().with_echo(!once));
    let system: Arc<dyn SystemAccess> = Arc::new(HostSystem::new());
    let mut scheduler = build_scheduler(prefs, Arc::clone(&board), system)?;

    if once {
        scheduler.start();
        if let Some(report) = board.latest_report() {
            println!("{}", report.title);
            println!("{}", report.compact);
            println!();
            println!("{}", report.expanded);
        }
        for key in scheduler.store().keys() {
            if let Some(points) = scheduler.store().get(&key) {
                let data = to_module_data(&key, &points);
                println!();
                println!("{}", serde_json::to_string(&data)?);
            }
        }
        scheduler.stop();
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        scheduler.start();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            let wake = scheduler
                .next_wake()
                .unwrap_or_else(|| tokio::time::Instant::now() + scheduler.next_delay());
            tokio::select! {
                _ = tokio::time::sleep_until(wake) => {
                    scheduler.fire();
                }
                _ = &mut ctrl_c => {
                    info!("Interrupted");
                    break;
                }
            }
        }

        scheduler.stop();
    });

    Ok(())
}
