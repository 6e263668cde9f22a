//! Core domain logic for the earnings calendar.
//!
//! This crate contains the fundamental types and logic for:
//! - Normalization: turning raw time/session fields into a timing signal
//! - Resolution: picking one localized start time per announcement
//! - Assembly: titles, descriptions and stable event ids
//! - Tables: upcoming announcements per sector and per ticker

mod assemble;
pub mod config;
pub mod coverage;
pub mod label;
pub mod normalize;
pub mod record;
pub mod resolve;
pub mod session;
pub mod table;
pub mod types;

pub use assemble::{
    AssemblyReport, EventAssembler, ID_SCHEME_VERSION, PERIOD_NULL_MARKER, ResolvedEvent,
    stable_id,
};
pub use config::{ConfigError, ResolverConfig};
pub use coverage::{CoverageGroup, CoverageTable};
pub use normalize::{NormalizedTime, normalize};
pub use record::{
    AnnouncementRecord, ColumnMap, RawAnnouncement, SchemaError, SkipReason, SkippedRecord,
};
pub use resolve::{Resolution, ResolutionRule, Resolver};
pub use session::{SessionTag, SessionTimes};
pub use table::{CalendarTables, HistoryColumns, HistoryRow, Universe, build_tables};
pub use types::{ClockTime, ValidationError};
