use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Base directory for ClawdBay configuration and logs.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cb")
}

/// Sessions owned by this tool are named `cb:<identifier>`.
pub const SESSION_PREFIX: &str = "cb:";

/// Monitored windows are named `claude` or `claude:<label>`.
pub const MONITORED_WINDOW_PREFIX: &str = "claude";

/// Project name used when a session's repository can't be resolved.
pub const UNKNOWN_REPO: &str = "Unknown";

/// How often the UI loop wakes up to run timers (ms).
pub const TICK_RATE_MS: u64 = 250;

/// Delay between the end of one fetch and the start of the next (seconds).
pub const REFRESH_INTERVAL_SECS: u64 = 3;

/// Bounds accepted for the refresh interval, from the CLI or the file.
pub const MIN_REFRESH_SECS: u64 = 1;
pub const MAX_REFRESH_SECS: u64 = 3600;

/// Default tracing filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "cb=info";

// ---------------------------------------------------------------------------
// User config (~/.config/cb/config.toml)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub dashboard: Option<DashboardConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardConfig {
    pub refresh_interval_secs: Option<u64>,
    pub tick_rate_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. `"cb=debug"`.
    pub level: Option<String>,
}

impl Config {
    /// Refresh interval, clamped into the accepted range.
    pub fn refresh_interval(&self) -> Duration {
        let secs = self
            .dashboard
            .as_ref()
            .and_then(|d| d.refresh_interval_secs)
            .unwrap_or(REFRESH_INTERVAL_SECS)
            .clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS);
        Duration::from_secs(secs)
    }

    pub fn tick_rate(&self) -> Duration {
        let ms = self
            .dashboard
            .as_ref()
            .and_then(|d| d.tick_rate_ms)
            .filter(|ms| *ms > 0)
            .unwrap_or(TICK_RATE_MS);
        Duration::from_millis(ms)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    /// Apply a `--interval` override from the command line.
    pub fn with_refresh_override(mut self, secs: Option<u64>) -> Self {
        if let Some(secs) = secs {
            self.dashboard
                .get_or_insert_with(DashboardConfig::default)
                .refresh_interval_secs = Some(secs);
        }
        self
    }
}

/// Load `config.toml` from the given directory.
/// A missing or unreadable file is the default config. A file that doesn't
/// parse is returned as an error; callers fall back to defaults and report
/// it once logging is up.
pub fn load_config(dir: &Path) -> Result<Config, toml::de::Error> {
    let path = dir.join("config.toml");
    match std::fs::read_to_string(&path) {
        Ok(content) => toml::from_str(&content),
        Err(_) => Ok(Config::default()),
    }
}

/// clap value parser for `--interval`.
pub fn parse_refresh_secs(s: &str) -> Result<u64, String> {
    let v: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a whole number of seconds", s))?;
    if !(MIN_REFRESH_SECS..=MAX_REFRESH_SECS).contains(&v) {
        return Err(format!(
            "interval must be between {} and {} seconds, got {}",
            MIN_REFRESH_SECS, MAX_REFRESH_SECS, v
        ));
    }
    Ok(v)
}
