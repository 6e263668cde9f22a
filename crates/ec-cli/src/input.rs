//! CSV input tables.
//!
//! Headers must be UTF-8. A data row that is not is skipped and counted,
//! the rest of the table is still read.

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use ec_core::{
    AssemblyReport, ColumnMap, EventAssembler, HistoryColumns, HistoryRow, RawAnnouncement,
    SkipReason, SkippedRecord,
};

/// An announcement table with the column used for the time field.
#[derive(Debug)]
pub struct AnnouncementTable {
    pub rows: Vec<RawAnnouncement>,
    pub time_column: Option<String>,
    /// Rows dropped before assembly. `row` is the zero-based data row.
    pub skipped: Vec<SkippedRecord>,
    /// Data row of each entry in `rows`.
    source_rows: Vec<usize>,
}

impl AnnouncementTable {
    /// Assembles every decoded row. Skipped rows from reading and from
    /// assembly are reported together, by data row.
    pub fn assemble(self, assembler: &EventAssembler<'_>) -> AssemblyReport {
        let mut report = assembler.assemble_all(&self.rows);
        for skipped in &mut report.skipped {
            skipped.row = self.source_rows[skipped.row];
        }
        report.skipped.extend(self.skipped);
        report.skipped.sort_by_key(|s| s.row);
        report
    }
}

/// The provider history with the number of rows that could not be decoded.
#[derive(Debug)]
pub struct HistoryTable {
    pub rows: Vec<HistoryRow>,
    pub undecodable: usize,
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))
}

fn headers(reader: &mut csv::Reader<std::fs::File>, path: &Path) -> Result<Vec<String>> {
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read headers of {}", path.display()))?;
    Ok(headers.iter().map(String::from).collect())
}

/// Decodes every cell, or `None` if any cell is not UTF-8.
fn decode(record: &csv::ByteRecord) -> Option<Vec<&str>> {
    record
        .iter()
        .map(|cell| std::str::from_utf8(cell).ok())
        .collect()
}

/// Reads an announcement table. Missing `Ticker`/`Date` columns are fatal.
pub fn read_announcements(path: &Path) -> Result<AnnouncementTable> {
    let mut reader = open(path)?;
    let headers = headers(&mut reader, path)?;
    let columns = ColumnMap::from_headers(&headers)
        .with_context(|| format!("invalid announcement table {}", path.display()))?;

    let mut rows = Vec::new();
    let mut source_rows = Vec::new();
    let mut skipped = Vec::new();
    let display = path.display();
    for (row, record) in reader.byte_records().enumerate() {
        let record =
            record.with_context(|| format!("failed to read row {} of {display}", row + 1))?;

        if let Some(cells) = decode(&record) {
            rows.push(columns.extract(&cells));
            source_rows.push(row);
            continue;
        }

        let lossy: Vec<Cow<'_, str>> = record.iter().map(String::from_utf8_lossy).collect();
        let ticker = columns.extract(&lossy).ticker;
        tracing::warn!(
            row = row + 1,
            ticker = ticker.as_deref().unwrap_or(""),
            path = %path.display(),
            "skipping row that is not valid UTF-8"
        );
        skipped.push(SkippedRecord {
            row,
            ticker,
            reason: SkipReason::InvalidEncoding,
        });
    }

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        skipped = skipped.len(),
        "read announcement table"
    );
    Ok(AnnouncementTable {
        rows,
        time_column: columns.time_column().map(String::from),
        skipped,
        source_rows,
    })
}

/// Reads the provider announcement history.
pub fn read_history(path: &Path) -> Result<HistoryTable> {
    let mut reader = open(path)?;
    let headers = headers(&mut reader, path)?;
    let columns = HistoryColumns::from_headers(&headers)
        .with_context(|| format!("invalid history table {}", path.display()))?;

    let mut rows = Vec::new();
    let mut undecodable = 0;
    let display = path.display();
    for (line, record) in reader.byte_records().enumerate() {
        let record =
            record.with_context(|| format!("failed to read row {} of {display}", line + 1))?;

        let Some(cells) = decode(&record) else {
            tracing::warn!(
                row = line + 1,
                path = %path.display(),
                "skipping history row that is not valid UTF-8"
            );
            undecodable += 1;
            continue;
        };

        let row = columns.extract(&cells);
        if row.provider_ticker.is_empty() {
            tracing::debug!(row = line + 1, "skipping history row without ticker");
            continue;
        }
        rows.push(row);
    }

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        undecodable,
        "read history table"
    );
    Ok(HistoryTable { rows, undecodable })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_announcements_with_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "next.csv",
            b"Sector,Ticker,Period,Date,Time (raw)\n\
              Banks,ITUB4,3Q24,2024-11-05,\n\
              Oil & Gas,PETR4,3Q24,2024-11-07,Aft-mkt\n",
        );

        let table = read_announcements(&path).unwrap();
        assert_eq!(table.time_column.as_deref(), Some("Time (raw)"));
        assert_eq!(table.rows.len(), 2);
        assert!(table.skipped.is_empty());
        assert_eq!(table.rows[0].time, None);
        assert_eq!(table.rows[1].sector.as_deref(), Some("Oil & Gas"));
        assert_eq!(table.rows[1].time.as_deref(), Some("Aft-mkt"));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.csv", b"Sector,Ticker\nBanks,ITUB4\n");

        let err = read_announcements(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("invalid announcement table"), "{message}");
        assert!(message.contains("Date"), "{message}");
    }

    #[test]
    fn latin1_row_is_skipped_and_the_rest_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "next.csv",
            b"Sector,Ticker,Period,Date,Time\n\
              Banks,ITUB4,3Q24,2024-11-05,\n\
              El\xe9tricas,EGIE3,3Q24,2024-11-06,Bef-mkt\n\
              Oil & Gas,PETR4,3Q24,2024-11-07,Aft-mkt\n",
        );

        let table = read_announcements(&path).unwrap();
        let tickers: Vec<&str> = table
            .rows
            .iter()
            .filter_map(|r| r.ticker.as_deref())
            .collect();
        assert_eq!(tickers, vec!["ITUB4", "PETR4"]);

        assert_eq!(table.skipped.len(), 1);
        assert_eq!(table.skipped[0].row, 1);
        assert_eq!(table.skipped[0].ticker.as_deref(), Some("EGIE3"));
        assert_eq!(table.skipped[0].reason, SkipReason::InvalidEncoding);
    }

    #[test]
    fn assembly_reports_skips_by_data_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "next.csv",
            b"Sector,Ticker,Date
              El\xe9tricas,EGIE3,2024-11-06
              Banks,ITUB4,2024-11-05
              Banks,nan,2024-11-05
",
        );

        let config = ec_core::ResolverConfig::default();
        let assembler = EventAssembler::new(ec_core::Resolver::new(&config));
        let report = read_announcements(&path).unwrap().assemble(&assembler);

        assert_eq!(report.events.len(), 1);
        let skipped: Vec<(usize, &SkipReason)> =
            report.skipped.iter().map(|s| (s.row, &s.reason)).collect();
        let expected = vec![
            (0, &SkipReason::InvalidEncoding),
            (2, &SkipReason::MissingTicker),
        ];
        assert_eq!(skipped, expected);
    }

    #[test]
    fn reads_history_and_drops_blank_tickers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "history.csv",
            b"ticker,year/period,announcement_date,announcement_time\n\
              PETR4 BZ Equity,2024:Q3,2024-11-07,Aft-mkt\n\
              ,2024:Q3,2024-11-07,\n",
        );

        let table = read_history(&path).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.undecodable, 0);
        assert_eq!(table.rows[0].provider_ticker, "PETR4 BZ Equity");
        assert_eq!(table.rows[0].time.as_deref(), Some("Aft-mkt"));
    }

    #[test]
    fn history_counts_undecodable_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "history.csv",
            b"ticker,year/period,announcement_date,announcement_time\n\
              EGIE3 BZ Equity,2024:Q3,2024-11-06,Bef-mkt \xa0\n\
              PETR4 BZ Equity,2024:Q3,2024-11-07,Aft-mkt\n",
        );

        let table = read_history(&path).unwrap();
        assert_eq!(table.undecodable, 1);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].provider_ticker, "PETR4 BZ Equity");
    }

    #[test]
    fn missing_file_has_context() {
        let err = read_history(Path::new("/nonexistent/history.csv")).unwrap_err();
        assert!(err.to_string().contains("failed to open"));
    }
}
