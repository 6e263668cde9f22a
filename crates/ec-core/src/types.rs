//! Core value types with validation.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pre-compiled pattern for `H:MM` / `HH:MM` clock strings.
static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").unwrap());

/// Strings that stand in for a missing value in upstream tables.
const NULL_MARKERS: &[&str] = &["nan", "none", "null", "n/a"];

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The string is not shaped like `HH:MM`.
    #[error("invalid clock time {value:?}, expected HH:MM")]
    MalformedClock { value: String },

    /// The string is shaped like `HH:MM` but hour or minute is out of range.
    #[error("clock time {value:?} out of range (hour 0-23, minute 0-59)")]
    ClockOutOfRange { value: String },
}

/// A wall-clock time with minute precision.
///
/// Serialized as `"HH:MM"` so configuration files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Creates a clock time, rejecting hours above 23 and minutes above 59.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::ClockOutOfRange {
                value: format!("{hour}:{minute:02}"),
            });
        }
        Ok(Self { hour, minute })
    }

    /// Builds a constant clock time. Callers guarantee the range.
    pub(crate) const fn from_parts(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    #[must_use]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    #[must_use]
    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// Converts to a `chrono` time at second zero.
    #[must_use]
    pub fn to_naive(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0).unwrap_or_default()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(caps) = CLOCK_RE.captures(s) else {
            return Err(ValidationError::MalformedClock {
                value: s.to_string(),
            });
        };

        // At most two digits each, so these always fit in u8
        let hour: u8 = caps[1].parse().map_err(|_| ValidationError::MalformedClock {
            value: s.to_string(),
        })?;
        let minute: u8 = caps[2].parse().map_err(|_| ValidationError::MalformedClock {
            value: s.to_string(),
        })?;

        Self::new(hour, minute).map_err(|_| ValidationError::ClockOutOfRange {
            value: s.to_string(),
        })
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

/// Returns true for blank strings and placeholder values such as `nan`.
pub fn is_null_marker(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || NULL_MARKERS.iter().any(|m| m.eq_ignore_ascii_case(s))
}

/// Trims a field and maps null markers to `None`.
pub fn present(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !is_null_marker(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_parses_one_and_two_digit_hours() {
        assert_eq!(
            "9:05".parse::<ClockTime>().unwrap(),
            ClockTime::new(9, 5).unwrap()
        );
        assert_eq!(
            "18:00".parse::<ClockTime>().unwrap(),
            ClockTime::new(18, 0).unwrap()
        );
        assert_eq!(" 07:30 ".parse::<ClockTime>().unwrap().to_string(), "07:30");
    }

    #[test]
    fn clock_distinguishes_malformed_from_out_of_range() {
        assert!(matches!(
            "24:00".parse::<ClockTime>(),
            Err(ValidationError::ClockOutOfRange { .. })
        ));
        assert!(matches!(
            "12:60".parse::<ClockTime>(),
            Err(ValidationError::ClockOutOfRange { .. })
        ));
        assert!(matches!(
            "12:5".parse::<ClockTime>(),
            Err(ValidationError::MalformedClock { .. })
        ));
        assert!(matches!(
            "123:00".parse::<ClockTime>(),
            Err(ValidationError::MalformedClock { .. })
        ));
        assert!(matches!(
            "Aft-mkt".parse::<ClockTime>(),
            Err(ValidationError::MalformedClock { .. })
        ));
    }

    #[test]
    fn clock_serde_uses_hhmm_string() {
        let t = ClockTime::new(8, 0).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"08:00\"");
        let parsed: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, t);
        assert!(serde_json::from_str::<ClockTime>("\"25:00\"").is_err());
    }

    #[test]
    fn clock_to_naive() {
        let t = ClockTime::new(23, 59).unwrap().to_naive();
        assert_eq!(t, NaiveTime::from_hms_opt(23, 59, 0).unwrap());
    }

    #[test]
    fn null_markers() {
        for s in ["", "  ", "nan", "NaN", "None", "null", "N/A"] {
            assert!(is_null_marker(s), "{s:?} should be a null marker");
        }
        assert!(!is_null_marker("PETR4"));
        assert_eq!(present(Some(" Bancos ")), Some("Bancos"));
        assert_eq!(present(Some("nan")), None);
        assert_eq!(present(None), None);
    }
}
