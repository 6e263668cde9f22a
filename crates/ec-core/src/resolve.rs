//! Start-time resolution.
//!
//! Picks exactly one start timestamp for an announcement from a fixed
//! precedence of timing sources. The first rule that applies wins:
//!
//! 1. Explicit clock time: the given date at that time.
//! 2. Session tag: the session's default time. A post-market announcement is
//!    moved to the previous calendar day so the reminder fires the evening
//!    before the next trading session. Other sessions keep the date.
//! 3. Coverage group of the sector: the group's notification time.
//! 4. Fallback: the given date at the configured post-market fallback time.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::config::ResolverConfig;
use crate::normalize::NormalizedTime;
use crate::session::SessionTag;
use crate::types::ClockTime;

/// Which precedence rule produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionRule {
    Clock,
    Session(SessionTag),
    Coverage,
    Fallback,
}

/// A localized start time and its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub start: DateTime<Tz>,
    pub label: String,
    pub rule: ResolutionRule,
}

/// Applies the precedence rules against a shared, read-only configuration.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    config: &'a ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub const fn new(config: &'a ResolverConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &'a ResolverConfig {
        self.config
    }

    /// Resolves the start timestamp for one announcement. Total: always
    /// returns a value.
    pub fn resolve(
        &self,
        date: NaiveDate,
        sector: Option<&str>,
        time: NormalizedTime,
    ) -> Resolution {
        match time {
            NormalizedTime::Clock(clock) => Resolution {
                start: self.localize(date, clock),
                label: clock.to_string(),
                rule: ResolutionRule::Clock,
            },
            NormalizedTime::Session(tag) => {
                let event_date = match tag {
                    SessionTag::Post => date.pred_opt().unwrap_or(date),
                    SessionTag::Pre | SessionTag::During => date,
                };
                Resolution {
                    start: self.localize(event_date, self.config.session_times.get(tag)),
                    label: tag.label().to_string(),
                    rule: ResolutionRule::Session(tag),
                }
            }
            NormalizedTime::Unresolved => self.resolve_default(date, sector),
        }
    }

    fn resolve_default(self, date: NaiveDate, sector: Option<&str>) -> Resolution {
        if let Some(group) = sector.and_then(|s| self.config.coverage.group_for(s)) {
            return Resolution {
                start: self.localize(date, group.notify_at),
                label: format!("Notification for {} ({})", group.name, group.notify_at),
                rule: ResolutionRule::Coverage,
            };
        }

        Resolution {
            start: self.localize(date, self.config.fallback_time),
            label: SessionTag::Post.label().to_string(),
            rule: ResolutionRule::Fallback,
        }
    }

    /// Attaches the configured zone to a wall-clock date and time.
    pub fn localize(&self, date: NaiveDate, time: ClockTime) -> DateTime<Tz> {
        localize(self.config.timezone, date.and_time(time.to_naive()))
    }
}

/// Localizes a naive timestamp.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST spring-forward gap move one hour later.
pub fn localize(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            let shifted = naive + TimeDelta::hours(1);
            match tz.from_local_datetime(&shifted) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
                LocalResult::None => tz.from_utc_datetime(&naive),
            }
        }
    }
}
