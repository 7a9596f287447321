pub mod schema;
pub mod watcher;

pub use schema::{ColorConfig, CpuMode, Settings, AUTO_ADAPTER, MIN_INTERVAL_MS, OPACITY_RANGE};
pub use watcher::ConfigWatcher;

use std::path::{Path, PathBuf};
use taskmon_core::{MonitorError, Result};

/// Load settings from a TOML file.
///
/// A missing, unreadable or malformed file yields `Settings::default()` so the
/// overlay always starts; the reason is logged.
pub fn load(path: impl AsRef<Path>) -> Settings {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(
            "Settings file not found at '{}'; using defaults.",
            path.display()
        );
        return Settings::default();
    }

    match try_load(path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("{e}; using defaults.");
            Settings::default()
        }
    }
}

/// Strict variant of [`load`]: surfaces read and parse failures.
pub fn try_load(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| MonitorError::Config(format!("cannot read '{}': {e}", path.display())))?;
    parse(&raw)
}

/// Parse a settings document; numeric fields are clamped into range.
pub fn parse(raw: &str) -> Result<Settings> {
    toml::from_str::<Settings>(raw)
        .map(Settings::normalized)
        .map_err(|e| MonitorError::Config(format!("TOML parse error: {e}")))
}

/// Write `settings` to `path`, creating parent directories as needed.
pub fn save(path: impl AsRef<Path>, settings: &Settings) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let raw = toml::to_string_pretty(settings)
        .map_err(|e| MonitorError::Config(format!("TOML serialize error: {e}")))?;
    std::fs::write(path, raw)?;
    tracing::debug!("Settings saved to '{}'", path.display());
    Ok(())
}

/// Return the default settings path, honouring `$XDG_CONFIG_HOME` and
/// `%APPDATA%`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .or_else(|_| std::env::var("APPDATA"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("taskmon").join("taskmon.toml")
}
