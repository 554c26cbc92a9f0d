use color_eyre::eyre::{bail, Result};

use crate::cli::ConfigCommands;
use crate::config::{config_path, is_tuning_key, UserConfig, TUNING_KEYS};
use crate::daemon::is_daemon_running;
use crate::prefs::Prefs;

pub fn run(command: Option<ConfigCommands>, path: bool, reset: bool) -> Result<()> {
    let config_file = config_path();

    if let Some(ConfigCommands::Set { key, value }) = command {
        return set(&Prefs::open(&config_file), &key, value);
    }

    if path {
        println!("{}", config_file.display());
        return Ok(());
    }

    if reset {
        UserConfig::default().save()?;
        println!("Config reset to defaults at: {}", config_file.display());
        return Ok(());
    }

    let prefs = Prefs::open(&config_file);
    if let Some(path) = prefs.path() {
        println!("Config file: {}", path.display());
    }
    println!();
    println!("{}", toml::to_string_pretty(&prefs.snapshot())?);

    Ok(())
}

fn set(prefs: &Prefs, key: &str, value: i64) -> Result<()> {
    if !is_tuning_key(key) {
        let known: Vec<_> = TUNING_KEYS
            .iter()
            .map(|(k, unit)| format!("{} ({})", k, unit))
            .collect();
        bail!("Unknown setting '{}'. Known settings: {}", key, known.join(", "));
    }
    if value < 0 {
        bail!("'{}' must not be negative", key);
    }

    prefs.set_int(key, value)?;
    println!("Set {} = {}.", key, value);
    if is_daemon_running() {
        println!("The daemon applies this on its next cycle.");
    }
    Ok(())
}
