//! CLI subcommand implementations.

pub mod build;
pub mod events;
pub mod ics;
pub mod run;
