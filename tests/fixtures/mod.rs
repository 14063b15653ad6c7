//! Test fixtures for metadata resolution and file collection
//!
//! `extension/` is a small extension whose platform metadata files inherit
//! from `metadata.common`; `vendor/` sits outside it and is only reachable
//! through the `mapping` section.

use std::path::{Path, PathBuf};

/// Base directory of the fixture extension
pub fn extension_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/extension")
}

/// Path of the common metadata file every platform inherits from
pub fn common_metadata_path() -> PathBuf {
    extension_dir().join("metadata.common")
}

/// Path of a platform metadata file
pub fn platform_metadata_path(platform: &str) -> PathBuf {
    extension_dir().join(format!("metadata.{}", platform))
}
