//! Sector to coverage-group assignment.
//!
//! Groups and their sectors are configuration data. The table is built once,
//! validated, and then only read.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::types::ClockTime;

/// An analyst or team that covers a set of sectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageGroup {
    /// Display name of the group.
    pub name: String,
    /// Default notification time for announcements with no timing signal.
    pub notify_at: ClockTime,
    /// Sector labels this group covers.
    #[serde(default)]
    pub sectors: Vec<String>,
}

/// Lookup from sector label to its coverage group.
///
/// Sector labels are matched trimmed and case-insensitively. A sector may
/// belong to at most one group.
#[derive(Debug, Clone, Default)]
pub struct CoverageTable {
    groups: Vec<CoverageGroup>,
    by_sector: HashMap<String, usize>,
}

impl CoverageTable {
    /// Builds the table, rejecting duplicate group names and sectors claimed
    /// by more than one group.
    pub fn new(groups: Vec<CoverageGroup>) -> Result<Self, ConfigError> {
        let mut by_sector = HashMap::new();

        for (idx, group) in groups.iter().enumerate() {
            if group.name.trim().is_empty() {
                return Err(ConfigError::UnnamedCoverageGroup);
            }
            if groups[..idx].iter().any(|g| g.name == group.name) {
                return Err(ConfigError::DuplicateCoverageGroup {
                    name: group.name.clone(),
                });
            }

            for sector in &group.sectors {
                let key = sector_key(sector);
                if key.is_empty() {
                    continue;
                }
                if let Some(&prev) = by_sector.get(&key) {
                    let first: &CoverageGroup = &groups[prev];
                    return Err(ConfigError::OverlappingCoverage {
                        sector: sector.trim().to_string(),
                        first: first.name.clone(),
                        second: group.name.clone(),
                    });
                }
                by_sector.insert(key, idx);
            }
        }

        tracing::debug!(
            groups = groups.len(),
            sectors = by_sector.len(),
            "built coverage table"
        );
        Ok(Self { groups, by_sector })
    }

    /// Returns the group covering `sector`, if any.
    pub fn group_for(&self, sector: &str) -> Option<&CoverageGroup> {
        self.by_sector
            .get(&sector_key(sector))
            .map(|&idx| &self.groups[idx])
    }

    pub fn groups(&self) -> &[CoverageGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn sector_key(sector: &str) -> String {
    sector.trim().to_lowercase()
}
