//! Time-tag normalization.
//!
//! Turns a loosely formatted time-or-session field into a [`NormalizedTime`].
//! An explicit `HH:MM` clock time is always tried before session keywords,
//! so a string that satisfies both is a clock time.

use crate::session::SessionTag;
use crate::types::{ClockTime, is_null_marker};

/// The timing signal extracted from a raw field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizedTime {
    /// A published clock time.
    Clock(ClockTime),
    /// A market-session keyword without an exact time.
    Session(SessionTag),
    /// Blank, placeholder or unrecognized text.
    Unresolved,
}

impl NormalizedTime {
    #[must_use]
    pub const fn clock(self) -> Option<ClockTime> {
        match self {
            Self::Clock(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub const fn session(self) -> Option<SessionTag> {
        match self {
            Self::Session(s) => Some(s),
            _ => None,
        }
    }
}

/// Normalizes one raw time field. Never fails.
pub fn normalize(raw: Option<&str>) -> NormalizedTime {
    let Some(s) = raw.map(str::trim) else {
        return NormalizedTime::Unresolved;
    };
    if is_null_marker(s) {
        return NormalizedTime::Unresolved;
    }

    // Out-of-range clocks fall through to keyword matching
    if let Ok(time) = s.parse::<ClockTime>() {
        return NormalizedTime::Clock(time);
    }

    s.parse::<SessionTag>().map_or_else(
        |_| {
            tracing::trace!(raw = s, "unrecognized time field");
            NormalizedTime::Unresolved
        },
        NormalizedTime::Session,
    )
}

/// Normalizes several raw fields describing the same announcement.
///
/// The first clock time wins over any session tag, and the first session tag
/// wins over `Unresolved`, regardless of field order.
pub fn normalize_fields<'a, I>(fields: I) -> NormalizedTime
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut session = None;
    for field in fields {
        match normalize(field) {
            clock @ NormalizedTime::Clock(_) => return clock,
            NormalizedTime::Session(tag) => {
                session.get_or_insert(tag);
            }
            NormalizedTime::Unresolved => {}
        }
    }
    session.map_or(NormalizedTime::Unresolved, NormalizedTime::Session)
}
