// SPDX-License-Identifier: MIT
//! Engine configuration.
//!
//! Settings come from three layers, highest priority first: CLI flags and
//! `TRIAD_*` env vars, `{data_dir}/config.toml`, built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_USER: &str = "local";
const DEFAULT_WINDOW_DAYS: u32 = 30;

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// Log level filter string, e.g. "debug", "info,triad=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured).
    log_format: Option<String>,
    /// Default user id for CLI commands that do not pass `--user` (default: "local").
    user: Option<String>,
    /// Default analytics lookback window in days: 30, 90, or 365 (default: 30).
    analytics_window: Option<u32>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── EngineConfig ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    /// Log level filter (TRIAD_LOG env var / --log flag).
    pub log: String,
    /// "pretty" | "json" (TRIAD_LOG_FORMAT env var).
    pub log_format: String,
    /// User id CLI commands act as when `--user` is absent.
    pub user: String,
    /// Default analytics lookback window in days.
    pub analytics_window: u32,
}

impl EngineConfig {
    /// Build config from CLI/env args + optional TOML file.
    pub fn new(data_dir: Option<PathBuf>, log: Option<String>, user: Option<String>) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let log_format = std::env::var("TRIAD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let user = user
            .or(toml.user)
            .unwrap_or_else(|| DEFAULT_USER.to_string());

        let analytics_window = toml.analytics_window.unwrap_or(DEFAULT_WINDOW_DAYS);

        Self {
            data_dir,
            log,
            log_format,
            user,
            analytics_window,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/triad
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("triad");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/triad or ~/.local/share/triad
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("triad");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("triad");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\triad
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("triad");
        }
    }
    // Fallback
    PathBuf::from(".triad")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EngineConfig::new(Some(dir.path().to_path_buf()), None, None);
        assert_eq!(cfg.log, "info");
        assert_eq!(cfg.user, DEFAULT_USER);
        assert_eq!(cfg.analytics_window, DEFAULT_WINDOW_DAYS);
    }

    #[test]
    fn toml_layer_fills_in_unset_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "log = \"debug\"\nuser = \"mei\"\nanalytics_window = 90\n",
        )
        .unwrap();
        let cfg = EngineConfig::new(Some(dir.path().to_path_buf()), None, None);
        assert_eq!(cfg.log, "debug");
        assert_eq!(cfg.user, "mei");
        assert_eq!(cfg.analytics_window, 90);
    }

    #[test]
    fn cli_values_win_over_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "log = \"debug\"\n").unwrap();
        let cfg = EngineConfig::new(
            Some(dir.path().to_path_buf()),
            Some("warn".to_string()),
            Some("kai".to_string()),
        );
        assert_eq!(cfg.log, "warn");
        assert_eq!(cfg.user, "kai");
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "log = [not toml").unwrap();
        let cfg = EngineConfig::new(Some(dir.path().to_path_buf()), None, None);
        assert_eq!(cfg.log, "info");
    }
}
