//! Event assembly: titles, descriptions and stable identities.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::label::{GENERIC_PERIOD_LABEL, display_ticker, period_label};
use crate::record::{AnnouncementRecord, RawAnnouncement, SkippedRecord};
use crate::resolve::{Resolution, Resolver};

/// Version of the identity scheme below. Changing the hashed tuple changes
/// every id, so it must come with a new version.
pub const ID_SCHEME_VERSION: u32 = 1;

/// Stand-in for a missing period in the identity tuple.
pub const PERIOD_NULL_MARKER: &str = "nan";

const ID_SEPARATOR: &str = "|";

/// Derives the event id from `(ticker, period, date, timing label)`.
///
/// A version 5 UUID in the URL namespace over the fields joined with `|`.
/// Identical inputs give identical ids on every run.
pub fn stable_id(
    ticker: &str,
    period: Option<&str>,
    date: NaiveDate,
    timing_label: &str,
) -> Uuid {
    let date = date.format("%Y-%m-%d").to_string();
    let period = period.unwrap_or(PERIOD_NULL_MARKER);
    let base = [ticker, period, &date, timing_label].join(ID_SEPARATOR);
    Uuid::new_v5(&Uuid::NAMESPACE_URL, base.as_bytes())
}

/// A calendar event derived from one announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEvent {
    /// Display ticker (share-class digits removed).
    pub ticker: String,
    /// Announcement date as published.
    pub date: NaiveDate,
    pub period: Option<String>,
    pub sector: Option<String>,
    pub coverage_group: Option<String>,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub start: DateTime<Tz>,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub end: DateTime<Tz>,
    pub timing_label: String,
    pub title: String,
    pub description: String,
    pub stable_id: Uuid,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

fn serialize_rfc3339<S: Serializer>(dt: &DateTime<Tz>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.fixed_offset().to_rfc3339())
}

/// Outcome of assembling a batch of rows.
#[derive(Debug, Clone, Default)]
pub struct AssemblyReport {
    pub events: Vec<ResolvedEvent>,
    pub skipped: Vec<SkippedRecord>,
}

impl AssemblyReport {
    /// Number of rows left out of the output.
    pub fn ignored(&self) -> usize {
        self.skipped.len()
    }
}

/// Builds calendar events from announcement records.
#[derive(Debug, Clone, Copy)]
pub struct EventAssembler<'a> {
    resolver: Resolver<'a>,
}

impl<'a> EventAssembler<'a> {
    pub const fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }

    /// Resolves and assembles a single record.
    pub fn process(&self, record: &AnnouncementRecord) -> ResolvedEvent {
        let resolution = self.resolver.resolve(
            record.date,
            record.sector.as_deref(),
            record.normalized_time(),
        );
        self.assemble(record, &resolution)
    }

    /// Builds the event for a record and its resolved start.
    pub fn assemble(&self, record: &AnnouncementRecord, resolution: &Resolution) -> ResolvedEvent {
        let config = self.resolver.config();
        let ticker = display_ticker(&record.ticker).to_string();
        let label = resolution.label.as_str();

        let period = period_label(record.period.as_deref());
        let mut title = format!("[{ticker}] - {period} announcement");
        if !label.is_empty() && label != GENERIC_PERIOD_LABEL {
            let _ = write!(title, " ({label})");
        }

        let coverage_group = record
            .sector
            .as_deref()
            .and_then(|s| config.coverage.group_for(s))
            .map(|g| g.name.clone());

        let mut lines = vec![
            format!("Ticker: {ticker}"),
            format!("Date: {}", record.date.format("%Y-%m-%d")),
            format!("Timing: {label}"),
        ];
        if let Some(period) = &record.period {
            lines.push(format!("Period: {period}"));
        }
        if let Some(sector) = &record.sector {
            lines.push(format!("Sector: {sector}"));
        }
        if let Some(group) = &coverage_group {
            lines.push(format!("Coverage: {group}"));
        }

        ResolvedEvent {
            stable_id: stable_id(&ticker, record.period.as_deref(), record.date, label),
            date: record.date,
            period: record.period.clone(),
            sector: record.sector.clone(),
            coverage_group,
            start: resolution.start,
            end: resolution.start + config.event_duration(),
            timing_label: resolution.label.clone(),
            title,
            description: lines.join("\n"),
            categories: record.sector.iter().cloned().collect(),
            ticker,
        }
    }

    /// Validates, resolves and assembles every row. Output order follows
    /// input order; rows that cannot be used are reported, not fatal.
    pub fn assemble_all(&self, rows: &[RawAnnouncement]) -> AssemblyReport {
        let results: Vec<Result<ResolvedEvent, SkippedRecord>> = rows
            .par_iter()
            .enumerate()
            .map(|(row, raw)| {
                AnnouncementRecord::from_raw(raw)
                    .map(|record| self.process(&record))
                    .map_err(|reason| SkippedRecord {
                        row,
                        ticker: raw.ticker.clone(),
                        reason,
                    })
            })
            .collect();

        let mut report = AssemblyReport::default();
        for result in results {
            match result {
                Ok(event) => report.events.push(event),
                Err(skipped) => {
                    tracing::warn!(
                        row = skipped.row,
                        ticker = skipped.ticker.as_deref().unwrap_or(""),
                        reason = %skipped.reason,
                        "skipping record"
                    );
                    report.skipped.push(skipped);
                }
            }
        }

        tracing::debug!(
            created = report.events.len(),
            ignored = report.ignored(),
            "assembled events"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use insta::assert_snapshot;

    use crate::config::ResolverConfig;
    use crate::coverage::CoverageGroup;
    use crate::record::SkipReason;
    use crate::session::SessionTimes;
    use crate::types::ClockTime;

    fn config() -> ResolverConfig {
        ResolverConfig::new(
            "America/Sao_Paulo",
            SessionTimes::default(),
            ClockTime::new(18, 0).unwrap(),
            30,
            vec![CoverageGroup {
                name: "Desk A".to_string(),
                notify_at: ClockTime::new(7, 0).unwrap(),
                sectors: vec!["Banks".to_string()],
            }],
        )
        .unwrap()
    }

    fn row(ticker: &str, sector: &str, period: &str, date: &str, time: &str) -> RawAnnouncement {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        RawAnnouncement {
            ticker: opt(ticker),
            sector: opt(sector),
            period: opt(period),
            date: opt(date),
            time: opt(time),
            session: None,
        }
    }

    fn record(raw: &RawAnnouncement) -> AnnouncementRecord {
        AnnouncementRecord::from_raw(raw).unwrap()
    }

    #[test]
    fn title_uses_display_ticker_period_and_timing() {
        let config = config();
        let assembler = EventAssembler::new(Resolver::new(&config));

        let raw = row("PETR4", "Oil", "4T24", "2024-11-14", "AFT-MKT");
        let event = assembler.process(&record(&raw));
        assert_eq!(event.ticker, "PETR");
        assert_eq!(event.title, "[PETR] - 4Q24 announcement (Post-market)");
        assert_eq!(event.timing_label, "Post-market");
    }

    #[test]
    fn missing_period_uses_generic_label() {
        let config = config();
        let assembler = EventAssembler::new(Resolver::new(&config));

        let event = assembler.process(&record(&row("VALE3", "", "", "2024-10-24", "07:30")));
        assert_eq!(event.title, "[VALE] - Results announcement (07:30)");
        assert_eq!(event.period, None);
    }

    #[test]
    fn description_lists_fields_in_order() {
        let config = config();
        let assembler = EventAssembler::new(Resolver::new(&config));

        let event = assembler.process(&record(&row("ITUB4", "Banks", "3T24", "2024-11-05", "")));
        assert_snapshot!(event.description, @r"
        Ticker: ITUB
        Date: 2024-11-05
        Timing: Notification for Desk A (07:00)
        Period: 3T24
        Sector: Banks
        Coverage: Desk A
        ");
        assert_eq!(event.coverage_group.as_deref(), Some("Desk A"));
        assert_eq!(event.categories, vec!["Banks".to_string()]);
    }

    #[test]
    fn description_omits_absent_period_and_sector() {
        let config = config();
        let assembler = EventAssembler::new(Resolver::new(&config));

        let raw = row("WEGE3", "nan", "nan", "2024-10-23", "BEF-MKT");
        let event = assembler.process(&record(&raw));
        assert_eq!(
            event.description,
            "Ticker: WEGE\nDate: 2024-10-23\nTiming: Pre-market"
        );
        assert!(event.categories.is_empty());
    }

    #[test]
    fn end_is_start_plus_duration() {
        let config = config();
        let assembler = EventAssembler::new(Resolver::new(&config));

        let event = assembler.process(&record(&row("PETR4", "", "", "2024-11-14", "10:00")));
        let tz = chrono_tz::America::Sao_Paulo;
        assert_eq!(
            event.start,
            tz.with_ymd_and_hms(2024, 11, 14, 10, 0, 0).unwrap()
        );
        assert_eq!(
            event.end,
            tz.with_ymd_and_hms(2024, 11, 14, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn stable_id_is_deterministic_and_field_sensitive() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 14).unwrap();
        let a = stable_id("PETR", Some("4T24"), date, "Post-market");
        let b = stable_id("PETR", Some("4T24"), date, "Post-market");
        assert_eq!(a, b);
        assert_eq!(a.get_version_num(), 5);

        assert_ne!(a, stable_id("PETR", Some("4T24"), date, "Pre-market"));
        assert_ne!(a, stable_id("PETR", None, date, "Post-market"));
        assert_eq!(
            stable_id("PETR", None, date, "Post-market"),
            Uuid::new_v5(&Uuid::NAMESPACE_URL, b"PETR|nan|2024-11-14|Post-market")
        );
    }

    #[test]
    fn repeated_runs_produce_identical_ids() {
        let config = config();
        let assembler = EventAssembler::new(Resolver::new(&config));
        let rows = vec![
            row("PETR4", "Oil", "4T24", "2024-11-14", "AFT-MKT"),
            row("ITUB4", "Banks", "3T24", "2024-11-05", ""),
            row("VALE3", "Mining", "3Q24", "2024-10-24", "07:30"),
        ];

        let ids = || -> Vec<Uuid> {
            assembler
                .assemble_all(&rows)
                .events
                .iter()
                .map(|e| e.stable_id)
                .collect()
        };
        let first = ids();
        let second = ids();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn assemble_all_skips_bad_rows_and_keeps_order() {
        let config = config();
        let assembler = EventAssembler::new(Resolver::new(&config));
        let rows = vec![
            row("PETR4", "", "", "2024-11-14", ""),
            row("nan", "", "", "2024-11-14", ""),
            row("VALE3", "", "", "someday", ""),
            row("ITUB4", "", "", "2024-11-05", ""),
        ];

        let report = assembler.assemble_all(&rows);
        let tickers: Vec<&str> = report.events.iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["PETR", "ITUB"]);
        assert_eq!(report.ignored(), 2);
        assert_eq!(report.skipped[0].row, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::MissingTicker);
        assert_eq!(
            report.skipped[1].reason,
            SkipReason::UnparseableDate {
                value: "someday".to_string()
            }
        );
    }

    #[test]
    fn serializes_timestamps_with_offset() {
        let config = config();
        let assembler = EventAssembler::new(Resolver::new(&config));
        let event = assembler.process(&record(&row("PETR4", "", "", "2024-11-14", "10:00")));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["start"], "2024-11-14T10:00:00-03:00");
        assert_eq!(json["end"], "2024-11-14T10:30:00-03:00");
        assert_eq!(json["date"], "2024-11-14");
        assert!(json.get("categories").is_none());
    }
}
