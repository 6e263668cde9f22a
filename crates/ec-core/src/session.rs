//! Market-session tags as the single source of truth for session keywords.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ClockTime;

/// Coarse announcement timing used when no exact clock time is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionTag {
    /// Before the market opens.
    Pre,
    /// While the market is open.
    During,
    /// After the market closes.
    Post,
}

impl SessionTag {
    pub const ALL: [Self; 3] = [Self::Pre, Self::During, Self::Post];

    /// Human-readable label used in event titles and descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pre => "Pre-market",
            Self::During => "During market",
            Self::Post => "Post-market",
        }
    }

    /// Provider-style canonical keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Pre => "BEF-MKT",
            Self::During => "DUR-MKT",
            Self::Post => "AFT-MKT",
        }
    }
}

impl fmt::Display for SessionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SessionTag {
    type Err = UnknownSession;

    /// Matches after upper-casing and dropping whitespace, `_` and `-`,
    /// so `Aft-mkt`, `AFT_MKT` and `aft mkt` are the same key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_uppercase)
            .collect();

        match key.as_str() {
            "AFTMKT" | "AFTERMARKET" | "POSTMARKET" | "AMC" => Ok(Self::Post),
            "BEFMKT" | "BEFOREMARKET" | "PREMARKET" | "BMO" => Ok(Self::Pre),
            "DURMKT" | "DURINGMARKET" | "INTRADAY" => Ok(Self::During),
            _ => Err(UnknownSession(s.to_string())),
        }
    }
}

/// Error type for unrecognized session keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSession(String);

impl fmt::Display for UnknownSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown market session: {}", self.0)
    }
}

impl std::error::Error for UnknownSession {}

/// Default clock time for each session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTimes {
    pub pre: ClockTime,
    pub during: ClockTime,
    pub post: ClockTime,
}

impl SessionTimes {
    #[must_use]
    pub const fn get(&self, tag: SessionTag) -> ClockTime {
        match tag {
            SessionTag::Pre => self.pre,
            SessionTag::During => self.during,
            SessionTag::Post => self.post,
        }
    }
}

impl Default for SessionTimes {
    fn default() -> Self {
        Self {
            pre: ClockTime::from_parts(8, 0),
            during: ClockTime::from_parts(12, 0),
            post: ClockTime::from_parts(18, 0),
        }
    }
}
