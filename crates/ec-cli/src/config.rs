//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use ec_core::config::{DEFAULT_EVENT_DURATION_MIN, DEFAULT_FALLBACK_TIME, DEFAULT_TIMEZONE};
use ec_core::{ClockTime, ConfigError, CoverageGroup, ResolverConfig, SessionTimes, Universe};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::workbook::NEXT_PER_TICKER_FILE;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA zone all events are expressed in.
    pub timezone: String,

    /// Event length in minutes.
    pub event_duration_min: u32,

    /// Start time when no clock, session or coverage group applies.
    pub fallback_time: ClockTime,

    /// Default clock time per market session.
    pub session_times: SessionTimes,

    /// Coverage groups with their notification time and sectors.
    #[serde(default)]
    pub coverage: Vec<CoverageGroup>,

    /// Sector label to provider tickers.
    #[serde(default)]
    pub universe: Universe,

    /// Provider announcement history CSV.
    pub history_path: PathBuf,

    /// Directory the table CSVs are written to.
    pub workbook_dir: PathBuf,

    /// Calendar subscription file.
    pub calendar_path: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("timezone", &self.timezone)
            .field("event_duration_min", &self.event_duration_min)
            .field("fallback_time", &self.fallback_time)
            .field("session_times", &self.session_times)
            .field("coverage_groups", &self.coverage.len())
            .field("universe_sectors", &self.universe.len())
            .field("history_path", &self.history_path)
            .field("workbook_dir", &self.workbook_dir)
            .field("calendar_path", &self.calendar_path)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.name().to_string(),
            event_duration_min: DEFAULT_EVENT_DURATION_MIN,
            fallback_time: DEFAULT_FALLBACK_TIME,
            session_times: SessionTimes::default(),
            coverage: Vec::new(),
            universe: Universe::new(),
            history_path: PathBuf::from("history.csv"),
            workbook_dir: PathBuf::from("workbook"),
            calendar_path: PathBuf::from("earnings.ics"),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (EC_*, nested keys split on "__")
        figment = figment.merge(Env::prefixed("EC_").split("__"));

        figment.extract()
    }

    /// Validates the resolution settings into their immutable form.
    pub fn resolver_config(&self) -> Result<ResolverConfig, ConfigError> {
        ResolverConfig::new(
            &self.timezone,
            self.session_times,
            self.fallback_time,
            self.event_duration_min,
            self.coverage.clone(),
        )
    }

    /// Path of the next-per-ticker table inside the workbook directory.
    pub fn next_per_ticker_path(&self) -> PathBuf {
        self.workbook_dir.join(NEXT_PER_TICKER_FILE)
    }
}

/// Returns the platform-specific config directory for ec.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ec"))
}
