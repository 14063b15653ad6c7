//! Browser extension build front-end
//!
//! Resolves per-platform extension metadata (`metadata.<platform>`) with
//! inheritance and list diffs, derives build versions and package names
//! from it, and collects the files that go into a package. Archive
//! writing, templating and signing are left to downstream packagers.

pub mod error;
pub mod files;
pub mod logging;
pub mod metadata;

pub use chained_config::{ChainedConfig, ConfigError, Item};
pub use error::BuildError;
pub use files::{collect, Files};
pub use metadata::{
    app_id, available_platforms, build_number, build_version, default_file_name,
    package_extension, read_metadata, select_platform, Platform,
};
