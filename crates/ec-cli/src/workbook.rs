//! Writes the calendar tables as a set of CSV files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ec_core::CalendarTables;
use serde::Serialize;

pub const CALENDAR_FILE: &str = "calendar.csv";
pub const BY_SECTOR_FILE: &str = "by_sector.csv";
pub const NEXT_PER_TICKER_FILE: &str = "next_per_ticker.csv";
pub const INVALID_FILE: &str = "invalid.csv";

/// Header row of the announcement tables. Matches `CalendarRow`.
const CALENDAR_HEADERS: &[&str] = &[
    "Sector",
    "Ticker",
    "Provider Ticker",
    "Period",
    "Date",
    "Time (raw)",
    "Time (parsed)",
    "Start (local)",
    "Timing",
];

/// Header row of the invalid table. Matches `InvalidEntry`.
const INVALID_HEADERS: &[&str] = &["Sector", "Provider Ticker", "Reason"];

/// Writes all tables into `dir`, creating it if needed.
///
/// Empty tables still get their header row.
pub fn write_tables(dir: &Path, tables: &CalendarTables) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create workbook directory {}", dir.display()))?;

    let written = vec![
        write_table(&dir.join(CALENDAR_FILE), CALENDAR_HEADERS, &tables.calendar)?,
        write_table(
            &dir.join(BY_SECTOR_FILE),
            CALENDAR_HEADERS,
            &tables.by_sector,
        )?,
        write_table(
            &dir.join(NEXT_PER_TICKER_FILE),
            CALENDAR_HEADERS,
            &tables.next_per_ticker,
        )?,
        write_table(&dir.join(INVALID_FILE), INVALID_HEADERS, &tables.invalid)?,
    ];
    Ok(written)
}

fn write_table<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<PathBuf> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record(headers)?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "wrote table");
    Ok(path.to_path_buf())
}
