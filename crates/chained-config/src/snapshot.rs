//! Serializable snapshot of a resolved configuration
//!
//! Captures every merged value together with the file that defines it,
//! plus the digests of all files that took part in the merge.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigSource;

/// Schema version for resolved_config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "extbuild/resolved_config@1";

/// A single value and its defining file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotValue {
    pub value: String,
    pub source: PathBuf,
}

/// Resolved configuration with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this snapshot was taken
    pub created_at: DateTime<Utc>,

    /// Section name → option name → value
    pub sections: IndexMap<String, IndexMap<String, SnapshotValue>>,

    /// Contributing files in merge order
    pub sources: Vec<ConfigSource>,
}

impl ConfigSnapshot {
    /// Look up a value by section and option
    pub fn get(&self, section: &str, option: &str) -> Option<&SnapshotValue> {
        self.sections.get(section)?.get(option)
    }
}
