//! RFC 5545 calendar serialization of resolved events.
//!
//! Start and end are written as UTC instants, so clients never have to
//! interpret a `TZID`. Events are ordered by start, then id, so unchanged
//! input produces the same file apart from `DTSTAMP`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use ec_core::ResolvedEvent;

const PRODID: &str = "-//ec//Earnings Calendar//EN";

/// Maximum octets per content line before folding.
const FOLD_LIMIT: usize = 75;

/// Renders a complete `VCALENDAR` document with CRLF line endings.
pub fn render(events: &[ResolvedEvent], timezone: Tz, generated_at: DateTime<Utc>) -> String {
    let mut sorted: Vec<&ResolvedEvent> = events.iter().collect();
    sorted.sort_by_key(|e| (e.start, e.stable_id));

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        format!("X-WR-TIMEZONE:{}", timezone.name()),
    ];

    let dtstamp = format_utc(&generated_at);
    for event in sorted {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}", event.stable_id));
        lines.push(format!("DTSTAMP:{dtstamp}"));
        lines.push(format!("DTSTART:{}", format_utc(&event.start)));
        lines.push(format!("DTEND:{}", format_utc(&event.end)));
        lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
        lines.push(format!("DESCRIPTION:{}", escape_text(&event.description)));
        if !event.categories.is_empty() {
            let categories: Vec<String> = event.categories.iter().map(|c| escape_text(c)).collect();
            lines.push(format!("CATEGORIES:{}", categories.join(",")));
        }
        lines.push("END:VEVENT".to_string());
    }
    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in &lines {
        out.push_str(&fold_line(line));
        out.push_str("\r\n");
    }
    out
}

/// Writes the calendar file, creating parent directories as needed.
pub fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn format_utc<T: TimeZone>(dt: &DateTime<T>) -> String {
    dt.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escapes a TEXT value.
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Folds a content line at 75 octets without splitting a UTF-8 character.
/// Continuation lines start with a single space.
fn fold_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + line.len() / FOLD_LIMIT * 3);
    let mut width = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > FOLD_LIMIT {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(ch);
        width += len;
    }
    out
}
