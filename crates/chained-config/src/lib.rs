//! Chained INI-style configuration with list diffs and provenance.
//!
//! A configuration file may name a parent through the reserved `default`
//! section:
//!
//! ```text
//! [default]
//! inherit = ../metadata.common
//! ```
//!
//! The parent is merged first, so the child can override its values or
//! edit inherited whitespace-separated lists with `option += tokens` and
//! `option -= tokens`. Up to [`MAX_CHAIN_LENGTH`] files can be chained.
//!
//! Every merged value remembers the file that assigned it, which lets
//! callers resolve relative paths stored in values against the right
//! directory. The merged [`ChainedConfig`] is read-only; it has no
//! mutating methods at all:
//!
//! ```compile_fail
//! use chained_config::ChainedConfig;
//!
//! fn mutate(config: &mut ChainedConfig) {
//!     config.set("general", "version", "2.0");
//! }
//! ```
//!
//! ```no_run
//! use chained_config::ChainedConfig;
//!
//! let config = ChainedConfig::from_file("metadata.chrome")?;
//! for item in config.items("mapping")? {
//!     println!("{} <- {} (from {})", item.name, item.value, item.source.display());
//! }
//! # Ok::<(), chained_config::ConfigError>(())
//! ```

mod chain;
mod config;
mod document;
mod error;
mod loader;
mod parser;
mod snapshot;

pub use chain::{inherited_path, resolve_chain};
pub use config::{ChainedConfig, ConfigSource, Item};
pub use document::DiffOp;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use parser::{parse_str, Options, Sections, SourceFile};
pub use snapshot::{ConfigSnapshot, SnapshotValue, SCHEMA_ID, SCHEMA_VERSION};

/// Maximum number of files in one inheritance chain, the starting file included.
pub const MAX_CHAIN_LENGTH: usize = 5;

/// Section holding the `inherit` option.
pub const INHERIT_SECTION: &str = "default";

/// Option naming the parent file.
pub const INHERIT_OPTION: &str = "inherit";
