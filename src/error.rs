//! Errors for metadata resolution and package file collection

use std::io;
use std::path::PathBuf;

use chained_config::ConfigError;

use crate::metadata::Platform;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Metadata error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("No metadata file found in {}", .base_dir.display())]
    NoMetadata { base_dir: PathBuf },

    #[error("No metadata file for platform {platform}: {} does not exist", .path.display())]
    MissingPlatformMetadata { platform: Platform, path: PathBuf },

    #[error("Metadata found for several platforms ({available}), choose one")]
    PlatformRequired { available: String },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
