use color_eyre::eyre::{bail, Result};

use crate::cli::ModulesCommands;
use crate::daemon::{is_daemon_running, DaemonClient};
use crate::monitor::{Configuration, Registry};
use crate::prefs::Prefs;

pub fn run(command: Option<ModulesCommands>) -> Result<()> {
    let prefs = Prefs::load_default();
    let registry = Registry::builtin()?;

    match command {
        None => list(&registry, &prefs),
        Some(ModulesCommands::Enable { key }) => set_enabled(&registry, &prefs, &key, true),
        Some(ModulesCommands::Disable { key }) => set_enabled(&registry, &prefs, &key, false),
    }
}

fn list(registry: &Registry, prefs: &Prefs) -> Result<()> {
    let running = if is_daemon_running() {
        Some(DaemonClient::connect_checked()?.get_status()?.modules)
    } else {
        None
    };

    println!("{:<10} {:<16} {:<9} {:<8} DESCRIPTION", "KEY", "NAME", "ENABLED", "ALIVE");
    for module in registry.iter() {
        let key = module.key();
        let enabled = prefs.is_module_enabled(key, module.default_enabled());
        let alive = match &running {
            Some(infos) => infos
                .iter()
                .find(|info| info.key == key)
                .map(|info| if info.alive { "yes" } else { "no" })
                .unwrap_or("-"),
            None => "-",
        };
        println!(
            "{:<10} {:<16} {:<9} {:<8} {}",
            key,
            module.name(),
            if enabled { "yes" } else { "no" },
            alive,
            module.description()
        );
    }
    Ok(())
}

fn set_enabled(registry: &Registry, prefs: &Prefs, key: &str, enabled: bool) -> Result<()> {
    if registry.get(key).is_none() {
        let known: Vec<_> = registry.iter().map(|m| m.key()).collect();
        bail!("Unknown module '{}'. Known modules: {}", key, known.join(", "));
    }

    prefs.set_module_enabled(key, enabled)?;
    println!(
        "{} {}.",
        if enabled { "Enabled" } else { "Disabled" },
        key
    );
    if is_daemon_running() {
        println!("The daemon applies this on its next cycle.");
    }
    Ok(())
}
