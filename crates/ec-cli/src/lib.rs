//! Earnings calendar CLI library.
//!
//! This crate provides the CLI interface, configuration and file formats
//! around the core resolution logic.

mod cli;
pub mod commands;
mod config;
pub mod ical;
pub mod input;
pub mod workbook;

pub use cli::{Cli, Commands};
pub use config::Config;
