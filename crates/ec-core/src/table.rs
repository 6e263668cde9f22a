//! Upcoming-announcement tables built from provider history.
//!
//! Joins the sector universe with the provider's announcement history, keeps
//! future announcements, resolves each one and derives the per-sector and
//! next-per-ticker views plus a list of tickers that produced nothing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::label::short_ticker;
use crate::normalize::{NormalizedTime, normalize};
use crate::record::{SchemaError, find_column, parse_date, require_columns};
use crate::resolve::Resolver;
use crate::types::{ClockTime, present};

/// Sector label to provider tickers, e.g. `"Banks" = ["ITUB4 BZ Equity"]`.
pub type Universe = BTreeMap<String, Vec<String>>;

/// One ticker of the universe with the sector it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseEntry {
    pub sector: String,
    pub provider_ticker: String,
    pub ticker: String,
}

/// Flattens the universe in sector order.
///
/// Blank tickers are dropped. A ticker listed under several sectors keeps the
/// first one.
pub fn flatten_universe(universe: &Universe) -> Vec<UniverseEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for (sector, tickers) in universe {
        for provider_ticker in tickers {
            let provider_ticker = provider_ticker.trim();
            if provider_ticker.is_empty() {
                continue;
            }
            if !seen.insert(provider_ticker.to_uppercase()) {
                tracing::warn!(
                    ticker = provider_ticker,
                    sector = sector.as_str(),
                    "ticker listed in more than one sector, keeping the first"
                );
                continue;
            }
            entries.push(UniverseEntry {
                sector: sector.clone(),
                provider_ticker: provider_ticker.to_string(),
                ticker: short_ticker(provider_ticker).to_string(),
            });
        }
    }

    entries
}

/// One row of the provider's announcement history, as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryRow {
    pub provider_ticker: String,
    pub period: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Positions of the history fields within a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryColumns {
    ticker: usize,
    period: usize,
    date: usize,
    time: Option<usize>,
}

impl HistoryColumns {
    /// Maps headers to fields. Ticker, period and date are required.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, SchemaError> {
        let required = require_columns(headers, &["ticker", "year/period", "announcement_date"])?;
        Ok(Self {
            ticker: required[0],
            period: required[1],
            date: required[2],
            time: find_column(headers, &["announcement_time"]),
        })
    }

    pub fn extract<S: AsRef<str>>(&self, row: &[S]) -> HistoryRow {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|v| v.as_ref().trim().to_string())
                .filter(|v| !v.is_empty())
        };

        HistoryRow {
            provider_ticker: cell(Some(self.ticker)).unwrap_or_default(),
            period: cell(Some(self.period)),
            date: cell(Some(self.date)),
            time: cell(self.time),
        }
    }
}

/// A resolved upcoming announcement, shaped for tabular output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarRow {
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Provider Ticker")]
    pub provider_ticker: String,
    #[serde(rename = "Period")]
    pub period: Option<String>,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Time (raw)")]
    pub time_raw: Option<String>,
    #[serde(rename = "Time (parsed)")]
    pub time_parsed: Option<ClockTime>,
    #[serde(rename = "Start (local)", serialize_with = "serialize_local")]
    pub start_local: DateTime<Tz>,
    #[serde(rename = "Timing")]
    pub timing: String,
}

impl CalendarRow {
    /// Chronological key with unparsed times after parsed ones.
    const fn when(&self) -> (NaiveDate, bool, Option<ClockTime>) {
        (self.date, self.time_parsed.is_none(), self.time_parsed)
    }
}

fn serialize_local<S: Serializer>(dt: &DateTime<Tz>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.format("%Y-%m-%d %H:%M").to_string())
}

/// Why a universe ticker produced no calendar rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// The universe has no tickers at all.
    EmptySectorDict,
    /// The history has no announcement on or after the reference date.
    NoFutureEventsOrEmpty,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EmptySectorDict => "empty_sector_dict",
            Self::NoFutureEventsOrEmpty => "no_future_events_or_empty",
        };
        f.write_str(s)
    }
}

/// A universe entry without upcoming announcements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidEntry {
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "Provider Ticker")]
    pub provider_ticker: Option<String>,
    #[serde(rename = "Reason")]
    pub reason: InvalidReason,
}

/// All tables produced by one build.
#[derive(Debug, Clone, Default)]
pub struct CalendarTables {
    /// Every upcoming announcement, chronological.
    pub calendar: Vec<CalendarRow>,
    /// Every upcoming announcement, grouped by sector.
    pub by_sector: Vec<CalendarRow>,
    /// The earliest upcoming announcement of each ticker.
    pub next_per_ticker: Vec<CalendarRow>,
    pub invalid: Vec<InvalidEntry>,
}

/// Builds the calendar tables for announcements on or after `today`.
pub fn build_tables(
    universe: &Universe,
    history: &[HistoryRow],
    today: NaiveDate,
    resolver: &Resolver<'_>,
) -> CalendarTables {
    let entries = flatten_universe(universe);
    if entries.is_empty() {
        return CalendarTables {
            invalid: vec![InvalidEntry {
                sector: None,
                provider_ticker: None,
                reason: InvalidReason::EmptySectorDict,
            }],
            ..CalendarTables::default()
        };
    }

    let mut by_provider: HashMap<String, Vec<&HistoryRow>> = HashMap::new();
    let mut by_short: HashMap<String, Vec<&HistoryRow>> = HashMap::new();
    for row in history {
        by_provider
            .entry(row.provider_ticker.to_uppercase())
            .or_default()
            .push(row);
        by_short
            .entry(short_ticker(&row.provider_ticker).to_uppercase())
            .or_default()
            .push(row);
    }

    let mut calendar = Vec::new();
    let mut invalid = Vec::new();

    for entry in &entries {
        tracing::debug!(ticker = entry.ticker.as_str(), "collecting announcements");

        let rows = by_provider
            .get(&entry.provider_ticker.to_uppercase())
            .or_else(|| by_short.get(&entry.ticker.to_uppercase()))
            .map_or(&[][..], Vec::as_slice);

        let before = calendar.len();
        for row in rows {
            if let Some(calendar_row) = resolve_row(entry, row, today, *resolver) {
                calendar.push(calendar_row);
            }
        }

        if calendar.len() == before {
            invalid.push(InvalidEntry {
                sector: Some(entry.sector.clone()),
                provider_ticker: Some(entry.provider_ticker.clone()),
                reason: InvalidReason::NoFutureEventsOrEmpty,
            });
        }
    }

    let mut by_sector = calendar.clone();
    by_sector.sort_by(|a, b| {
        (&a.sector, a.when(), &a.ticker).cmp(&(&b.sector, b.when(), &b.ticker))
    });

    calendar.sort_by(|a, b| (a.when(), &a.ticker).cmp(&(b.when(), &b.ticker)));

    let next_per_ticker = next_per_ticker(&calendar);

    tracing::info!(
        rows = calendar.len(),
        tickers = next_per_ticker.len(),
        invalid = invalid.len(),
        "built calendar tables"
    );

    CalendarTables {
        calendar,
        by_sector,
        next_per_ticker,
        invalid,
    }
}

fn resolve_row(
    entry: &UniverseEntry,
    row: &HistoryRow,
    today: NaiveDate,
    resolver: Resolver<'_>,
) -> Option<CalendarRow> {
    let Some(date) = row.date.as_deref().and_then(parse_date) else {
        tracing::debug!(
            ticker = entry.ticker.as_str(),
            date = row.date.as_deref().unwrap_or(""),
            "dropping history row without a usable date"
        );
        return None;
    };
    if date < today {
        return None;
    }

    let time = normalize(row.time.as_deref());
    let time_parsed = match time {
        NormalizedTime::Clock(clock) => Some(clock),
        NormalizedTime::Session(tag) => Some(resolver.config().session_times.get(tag)),
        NormalizedTime::Unresolved => None,
    };
    let resolution = resolver.resolve(date, Some(&entry.sector), time);

    Some(CalendarRow {
        sector: entry.sector.clone(),
        ticker: entry.ticker.clone(),
        provider_ticker: entry.provider_ticker.clone(),
        period: present(row.period.as_deref()).map(String::from),
        date,
        time_raw: row.time.clone(),
        time_parsed,
        start_local: resolution.start,
        timing: resolution.label,
    })
}

/// Earliest row per ticker, ordered by sector, date and ticker.
fn next_per_ticker(calendar: &[CalendarRow]) -> Vec<CalendarRow> {
    let mut earliest: HashMap<&str, &CalendarRow> = HashMap::new();
    for row in calendar {
        earliest
            .entry(row.ticker.as_str())
            .and_modify(|current| {
                if row.when() < current.when() {
                    *current = row;
                }
            })
            .or_insert(row);
    }

    let mut rows: Vec<CalendarRow> = earliest.into_values().cloned().collect();
    rows.sort_by(|a, b| {
        (&a.sector, a.date, &a.ticker).cmp(&(&b.sector, b.date, &b.ticker))
    });
    rows
}
