//! Announcement records and the column layout they are read from.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::{NormalizedTime, normalize_fields};
use crate::types::present;

/// Column names accepted for the time field, in order of preference.
pub const TIME_COLUMNS: &[&str] = &["Time", "Time (raw)", "Time (parsed)", "announcement_time"];

/// A required column is missing from an input table.
///
/// Raised before any row is processed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("required columns missing: {missing:?} (available: {available:?})")]
pub struct SchemaError {
    pub missing: Vec<String>,
    pub available: Vec<String>,
}

/// Why a row was left out of the output.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The ticker is blank or a placeholder.
    #[error("missing ticker")]
    MissingTicker,

    /// The date is blank or a placeholder.
    #[error("missing date")]
    MissingDate,

    /// The date could not be parsed.
    #[error("unparseable date {value:?}")]
    UnparseableDate { value: String },

    /// The row is not valid UTF-8.
    #[error("row is not valid UTF-8")]
    InvalidEncoding,
}

/// A row excluded from the output, with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Zero-based data row index.
    pub row: usize,
    pub ticker: Option<String>,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// An input row as strings, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnnouncement {
    pub ticker: Option<String>,
    pub sector: Option<String>,
    pub period: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub session: Option<String>,
}

/// One scheduled announcement for a ticker and reporting period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementRecord {
    pub ticker: String,
    pub sector: Option<String>,
    pub period: Option<String>,
    pub date: NaiveDate,
    pub raw_time: Option<String>,
    pub raw_session: Option<String>,
}

impl AnnouncementRecord {
    /// Validates a raw row. Placeholder tickers and bad dates are skips,
    /// not errors.
    pub fn from_raw(raw: &RawAnnouncement) -> Result<Self, SkipReason> {
        let ticker = present(raw.ticker.as_deref()).ok_or(SkipReason::MissingTicker)?;
        let date_str = present(raw.date.as_deref()).ok_or(SkipReason::MissingDate)?;
        let date = parse_date(date_str).ok_or_else(|| SkipReason::UnparseableDate {
            value: date_str.to_string(),
        })?;

        Ok(Self {
            ticker: ticker.to_string(),
            sector: present(raw.sector.as_deref()).map(String::from),
            period: present(raw.period.as_deref()).map(String::from),
            date,
            raw_time: raw.time.clone(),
            raw_session: raw.session.clone(),
        })
    }

    /// Timing signal across the time and session fields.
    pub fn normalized_time(&self) -> NormalizedTime {
        normalize_fields([self.raw_time.as_deref(), self.raw_session.as_deref()])
    }
}

/// Parses the date formats seen in exported tables.
///
/// Time-of-day components are discarded.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // Compact YYYYMMDD
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year = s[..4].parse().ok()?;
        let month = s[4..6].parse().ok()?;
        let day = s[6..].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Finds the first header matching any of `names`, ignoring case and padding.
pub fn find_column<S: AsRef<str>>(headers: &[S], names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| h.as_ref().trim().eq_ignore_ascii_case(name))
    })
}

/// Checks that every required column is present.
pub fn require_columns<S: AsRef<str>>(
    headers: &[S],
    required: &[&str],
) -> Result<Vec<usize>, SchemaError> {
    let found: Vec<Option<usize>> = required
        .iter()
        .map(|name| find_column(headers, &[name]))
        .collect();

    let missing: Vec<String> = required
        .iter()
        .zip(&found)
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| (*name).to_string())
        .collect();

    if !missing.is_empty() {
        return Err(SchemaError {
            missing,
            available: headers.iter().map(|h| h.as_ref().to_string()).collect(),
        });
    }
    Ok(found.into_iter().flatten().collect())
}

/// Positions of the announcement fields within a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    ticker: usize,
    date: usize,
    sector: Option<usize>,
    period: Option<usize>,
    time: Option<usize>,
    session: Option<usize>,
    time_column: Option<String>,
}

impl ColumnMap {
    /// Maps headers to fields. `Ticker` and `Date` are required.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, SchemaError> {
        let required = require_columns(headers, &["Ticker", "Date"])?;
        let time = find_column(headers, TIME_COLUMNS);

        Ok(Self {
            ticker: required[0],
            date: required[1],
            sector: find_column(headers, &["Sector"]),
            period: find_column(headers, &["Period"]),
            time,
            session: find_column(headers, &["Session"]),
            time_column: time.map(|idx| headers[idx].as_ref().trim().to_string()),
        })
    }

    /// Name of the column the time field is read from, if any.
    pub fn time_column(&self) -> Option<&str> {
        self.time_column.as_deref()
    }

    /// Extracts the announcement fields from one row.
    pub fn extract<S: AsRef<str>>(&self, row: &[S]) -> RawAnnouncement {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|v| v.as_ref().to_string())
                .filter(|v| !v.trim().is_empty())
        };

        RawAnnouncement {
            ticker: cell(Some(self.ticker)),
            sector: cell(self.sector),
            period: cell(self.period),
            date: cell(Some(self.date)),
            time: cell(self.time),
            session: cell(self.session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::session::SessionTag;

    fn raw(ticker: &str, date: &str) -> RawAnnouncement {
        RawAnnouncement {
            ticker: Some(ticker.to_string()),
            date: Some(date.to_string()),
            ..RawAnnouncement::default()
        }
    }

    #[test]
    fn parses_common_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 11, 14);
        for s in [
            "2024-11-14",
            "2024-11-14 00:00:00",
            "2024-11-14 18:30",
            "2024-11-14T00:00:00",
            "14/11/2024",
            "20241114",
        ] {
            assert_eq!(parse_date(s), expected, "{s:?}");
        }
        assert_eq!(parse_date("14 Nov"), None);
        assert_eq!(parse_date("20241340"), None);
    }

    #[test]
    fn placeholder_ticker_is_skipped() {
        assert_eq!(
            AnnouncementRecord::from_raw(&raw("nan", "2024-11-14")),
            Err(SkipReason::MissingTicker)
        );
        assert_eq!(
            AnnouncementRecord::from_raw(&raw("  ", "2024-11-14")),
            Err(SkipReason::MissingTicker)
        );
    }

    #[test]
    fn bad_date_is_skipped() {
        assert_eq!(
            AnnouncementRecord::from_raw(&raw("PETR4", "soon")),
            Err(SkipReason::UnparseableDate {
                value: "soon".to_string()
            })
        );
        assert_eq!(
            AnnouncementRecord::from_raw(&raw("PETR4", "NaN")),
            Err(SkipReason::MissingDate)
        );
    }

    #[test]
    fn from_raw_drops_null_markers() {
        let record = AnnouncementRecord::from_raw(&RawAnnouncement {
            ticker: Some(" PETR4 ".to_string()),
            sector: Some("nan".to_string()),
            period: Some("4T24".to_string()),
            date: Some("2024-11-14".to_string()),
            time: Some("Aft-mkt".to_string()),
            session: None,
        })
        .unwrap();

        assert_eq!(record.ticker, "PETR4");
        assert_eq!(record.sector, None);
        assert_eq!(record.period.as_deref(), Some("4T24"));
        assert_eq!(
            record.normalized_time(),
            NormalizedTime::Session(SessionTag::Post)
        );
    }

    #[test]
    fn missing_required_columns_is_a_schema_error() {
        let err = ColumnMap::from_headers(&["Sector", "Period", "Time"]).unwrap_err();
        assert_eq!(err.missing, vec!["Ticker".to_string(), "Date".to_string()]);
        assert_eq!(err.available.len(), 3);
    }

    #[test]
    fn column_map_prefers_raw_time_over_parsed() {
        let headers = [
            "Sector",
            "Ticker",
            "Date",
            "Time (parsed)",
            "Time (raw)",
            "Period",
        ];
        let map = ColumnMap::from_headers(&headers).unwrap();
        assert_eq!(map.time_column(), Some("Time (raw)"));

        let row = ["Banks", "ITUB4", "2024-11-05", "18:00", "AFT-MKT", "3Q24"];
        let raw = map.extract(&row);
        assert_eq!(raw.ticker.as_deref(), Some("ITUB4"));
        assert_eq!(raw.time.as_deref(), Some("AFT-MKT"));
        assert_eq!(raw.period.as_deref(), Some("3Q24"));
        assert_eq!(raw.session, None);
    }

    #[test]
    fn column_map_without_time_column() {
        let map = ColumnMap::from_headers(&["ticker", "DATE"]).unwrap();
        assert_eq!(map.time_column(), None);
        let raw = map.extract(&["VALE3", "2024-10-24"]);
        assert_eq!(raw.time, None);
        assert_eq!(raw.date.as_deref(), Some("2024-10-24"));
    }

    #[test]
    fn short_rows_yield_missing_fields() {
        let map = ColumnMap::from_headers(&["Ticker", "Date", "Sector"]).unwrap();
        let raw = map.extract(&["VALE3"]);
        assert_eq!(raw.date, None);
        assert_eq!(raw.sector, None);
    }
}
