//! `config.toml` as the monitor's [`Configuration`] provider.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::config::{config_path, ConfigError, UserConfig};
use crate::monitor::Configuration;

/// Identifies one version of the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

struct PrefsState {
    config: UserConfig,
    fingerprint: Option<Fingerprint>,
}

/// Settings backed by a TOML file. External edits are picked up on
/// [`Configuration::refresh`]; local edits are written back immediately.
pub struct Prefs {
    path: Option<PathBuf>,
    state: RwLock<PrefsState>,
}

impl Prefs {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = PrefsState {
            config: UserConfig::load_from(&path),
            fingerprint: Fingerprint::of(&path),
        };
        Self {
            path: Some(path),
            state: RwLock::new(state),
        }
    }

    pub fn load_default() -> Self {
        Self::open(config_path())
    }

    /// Never touches the filesystem.
    pub fn in_memory(config: UserConfig) -> Self {
        Self {
            path: None,
            state: RwLock::new(PrefsState {
                config,
                fingerprint: None,
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> UserConfig {
        self.read().config.clone()
    }

    pub fn set_module_enabled(&self, key: &str, enabled: bool) -> Result<(), ConfigError> {
        self.update(|config| {
            config.modules.insert(key.to_string(), enabled);
        })
    }

    pub fn set_int(&self, key: &str, value: i64) -> Result<(), ConfigError> {
        self.update(|config| {
            config.tuning.insert(key.to_string(), value);
        })
    }

    /// Applies `edit` on top of the latest file contents and writes it back.
    fn update(&self, edit: impl FnOnce(&mut UserConfig)) -> Result<(), ConfigError> {
        let mut state = self.write();

        if let Some(path) = &self.path {
            let current = Fingerprint::of(path);
            if current != state.fingerprint {
                debug!(path = %path.display(), "Config changed on disk, merging before write");
                state.config = UserConfig::load_from(path);
                state.fingerprint = current;
            }
        }

        edit(&mut state.config);

        if let Some(path) = &self.path {
            state.config.save_to(path)?;
            state.fingerprint = Fingerprint::of(path);
        }
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, PrefsState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PrefsState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Configuration for Prefs {
    fn refresh(&self) {
        let Some(path) = &self.path else {
            return;
        };

        let current = Fingerprint::of(path);
        if current == self.read().fingerprint {
            return;
        }

        debug!(path = %path.display(), "Config changed on disk, reloading");
        let mut state = self.write();
        state.config = UserConfig::load_from(path);
        state.fingerprint = current;
    }

    fn is_module_enabled(&self, key: &str, default: bool) -> bool {
        self.read()
            .config
            .modules
            .get(key)
            .copied()
            .unwrap_or(default)
    }

    fn is_running(&self) -> bool {
        self.read().config.running
    }

    fn set_running(&self, running: bool) {
        if let Err(e) = self.update(|config| config.running = running) {
            warn!(error = %e, "Failed to persist running flag");
        }
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.read()
            .config
            .tuning
            .get(key)
            .copied()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("ebox-prefs-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join("config.toml")
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = temp_path("missing");
        let prefs = Prefs::open(&path);

        assert!(prefs.is_module_enabled("battery", true));
        assert!(!prefs.is_module_enabled("battery", false));
        assert_eq!(prefs.get_int("net_interval", 3000), 3000);
        assert!(!prefs.is_running());
        assert!(!path.exists());
    }

    #[test]
    fn test_writes_are_persisted() {
        let path = temp_path("persist");
        let prefs = Prefs::open(&path);

        prefs.set_module_enabled("network", false).unwrap();
        prefs.set_int("bat_interval", 20_000).unwrap();
        prefs.set_running(true);

        let reopened = Prefs::open(&path);
        assert!(!reopened.is_module_enabled("network", true));
        assert_eq!(reopened.get_int("bat_interval", 10_000), 20_000);
        assert!(reopened.is_running());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_refresh_picks_up_external_edit() {
        let path = temp_path("refresh");
        let prefs = Prefs::open(&path);
        prefs.set_module_enabled("unlock", true).unwrap();

        let other = Prefs::open(&path);
        other.set_module_enabled("unlock", false).unwrap();
        other.set_int("unlock_limit", 40).unwrap();

        assert!(prefs.is_module_enabled("unlock", true));
        prefs.refresh();
        assert!(!prefs.is_module_enabled("unlock", true));
        assert_eq!(prefs.get_int("unlock_limit", 0), 40);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_write_keeps_external_edit() {
        let path = temp_path("merge");
        let daemon = Prefs::open(&path);
        daemon.set_running(true);

        let cli = Prefs::open(&path);
        cli.set_module_enabled("network", false).unwrap();
        cli.set_int("bat_low_alert", 20).unwrap();

        // No refresh in between.
        daemon.set_running(false);

        let reopened = Prefs::open(&path);
        assert!(!reopened.is_module_enabled("network", true));
        assert_eq!(reopened.get_int("bat_low_alert", 15), 20);
        assert!(!reopened.is_running());
        assert!(!daemon.is_module_enabled("network", true));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_in_memory_never_writes() {
        let prefs = Prefs::in_memory(UserConfig::default());
        prefs.set_module_enabled("battery", false).unwrap();
        prefs.refresh();

        assert!(prefs.path().is_none());
        assert!(!prefs.snapshot().modules["battery"]);
    }
}
