//! Events command: resolved events as JSONL for inspection.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ec_core::{EventAssembler, Resolver};

use crate::{Config, input};

/// Writes one JSON object per resolved event.
pub fn run<W: Write>(writer: &mut W, config: &Config, input_path: &Path) -> Result<()> {
    let resolver_config = config
        .resolver_config()
        .context("invalid resolution settings")?;
    let table = input::read_announcements(input_path)?;

    let assembler = EventAssembler::new(Resolver::new(&resolver_config));
    let report = table.assemble(&assembler);

    for event in &report.events {
        serde_json::to_writer(&mut *writer, event).context("failed to serialize event")?;
        // Handle broken pipe gracefully (e.g., when piped to `head`)
        if writeln!(writer).is_err() {
            break;
        }
    }

    Ok(())
}
