//! Immutable resolution settings shared by the resolver and assembler.

use chrono::TimeDelta;
use chrono_tz::Tz;
use thiserror::Error;

use crate::coverage::{CoverageGroup, CoverageTable};
use crate::session::SessionTimes;
use crate::types::ClockTime;

/// Zone every event is localized to unless configured otherwise.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Default event length in minutes.
pub const DEFAULT_EVENT_DURATION_MIN: u32 = 30;

/// Start time used when nothing else applies.
pub const DEFAULT_FALLBACK_TIME: ClockTime = ClockTime::from_parts(18, 0);

/// Invalid configuration. Always fatal, raised before any record is read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The timezone is not a known IANA name.
    #[error("unknown timezone: {name}")]
    UnknownTimezone { name: String },

    /// Events must last at least one minute.
    #[error("event duration must be positive")]
    ZeroDuration,

    /// A coverage group has a blank name.
    #[error("coverage group name cannot be empty")]
    UnnamedCoverageGroup,

    /// Two coverage groups share a name.
    #[error("duplicate coverage group: {name}")]
    DuplicateCoverageGroup { name: String },

    /// A sector is listed under more than one coverage group.
    #[error("sector {sector:?} is covered by both {first:?} and {second:?}")]
    OverlappingCoverage {
        sector: String,
        first: String,
        second: String,
    },
}

/// Settings for turning announcement records into calendar events.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Zone all start and end timestamps are expressed in.
    pub timezone: Tz,
    /// Default clock time per market session.
    pub session_times: SessionTimes,
    /// Start time when no clock, session or coverage group applies.
    pub fallback_time: ClockTime,
    /// Event length in minutes.
    pub event_duration_min: u32,
    /// Sector to coverage-group assignments.
    pub coverage: CoverageTable,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            session_times: SessionTimes::default(),
            fallback_time: DEFAULT_FALLBACK_TIME,
            event_duration_min: DEFAULT_EVENT_DURATION_MIN,
            coverage: CoverageTable::default(),
        }
    }
}

impl ResolverConfig {
    /// Builds a validated configuration from raw settings.
    pub fn new(
        timezone: &str,
        session_times: SessionTimes,
        fallback_time: ClockTime,
        event_duration_min: u32,
        coverage: Vec<CoverageGroup>,
    ) -> Result<Self, ConfigError> {
        if event_duration_min == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(Self {
            timezone: parse_timezone(timezone)?,
            session_times,
            fallback_time,
            event_duration_min,
            coverage: CoverageTable::new(coverage)?,
        })
    }

    /// Event length as a duration.
    #[must_use]
    pub fn event_duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.event_duration_min))
    }
}

/// Parses an IANA timezone name such as `America/Sao_Paulo`.
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimezone {
            name: name.to_string(),
        })
}
