//! Ics command: announcement table to calendar subscription file.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ec_core::{AssemblyReport, EventAssembler, Resolver};

use crate::{Config, ical, input};

/// Runs the ics command and returns the assembled events.
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    input_path: &Path,
    output_path: &Path,
    generated_at: DateTime<Utc>,
) -> Result<AssemblyReport> {
    let resolver_config = config
        .resolver_config()
        .context("invalid resolution settings")?;

    writeln!(writer, "Reading {}", input_path.display())?;
    let table = input::read_announcements(input_path)?;
    match &table.time_column {
        Some(column) => writeln!(writer, "Time column: {column}")?,
        None => {
            tracing::warn!("no time column found, using default times");
            writeln!(writer, "No time column found, using default times")?;
        }
    }

    let assembler = EventAssembler::new(Resolver::new(&resolver_config));
    let report = table.assemble(&assembler);

    let content = ical::render(&report.events, resolver_config.timezone, generated_at);
    ical::write(output_path, &content)?;

    writeln!(writer, "Calendar:       {}", output_path.display())?;
    writeln!(writer, "Events created: {}", report.events.len())?;
    if report.ignored() > 0 {
        writeln!(writer, "Events ignored: {}", report.ignored())?;
    }
    writeln!(
        writer,
        "Timezone:       {}",
        resolver_config.timezone.name()
    )?;

    Ok(report)
}
