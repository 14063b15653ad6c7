//! Error types for loading and querying chained configuration.

use std::io;
use std::path::PathBuf;

/// Errors raised while reading, merging or querying configuration files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// The file that could not be read
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse error in {} at line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        /// 1-based line number
        line: usize,
        message: String,
    },

    #[error("File contains no section headers: {} at line {line}", .path.display())]
    MissingSectionHeader { path: PathBuf, line: usize },

    #[error("Inheritance chain exceeds {limit} files at {}", .path.display())]
    ChainTooLong {
        /// The file whose `inherit` option would exceed the limit
        path: PathBuf,
        limit: usize,
    },

    #[error("Failed to apply diff for unknown option '{option}' in section '{section}'")]
    DiffForUnknownOption { section: String, option: String },

    #[error("No section: '{0}'")]
    NoSuchSection(String),

    #[error("No option '{option}' in section '{section}'")]
    NoSuchOption { section: String, option: String },

    #[error("Not a boolean: '{value}' ({section}.{option})")]
    InvalidBoolean {
        section: String,
        option: String,
        value: String,
    },

    #[error("Not an integer: '{value}' ({section}.{option})")]
    InvalidInteger {
        section: String,
        option: String,
        value: String,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True if this is an I/O error caused by a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
