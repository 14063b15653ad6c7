//! Inheritance chain resolution.
//!
//! Follows `default.inherit` from a starting file back to its root
//! ancestor. The result is ordered root-first so that descendants are
//! merged after, and can diff against, the files they inherit from.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;
use crate::parser::SourceFile;
use crate::MAX_CHAIN_LENGTH;

/// Resolve the chain of files ending at `start`, root ancestor first.
///
/// The chain may hold at most [`MAX_CHAIN_LENGTH`] files including
/// `start`. This cap is also the only guard against circular `inherit`
/// references: a cycle keeps adding links until it trips the cap.
pub fn resolve_chain(start: SourceFile) -> Result<Vec<SourceFile>, ConfigError> {
    let mut chain = vec![start];

    loop {
        let front = &chain[0];
        let Some(inherit) = front.inherit() else {
            return Ok(chain);
        };

        if chain.len() >= MAX_CHAIN_LENGTH {
            return Err(ConfigError::ChainTooLong {
                path: front.path.clone(),
                limit: MAX_CHAIN_LENGTH,
            });
        }

        let parent_path = inherited_path(&front.path, inherit);
        debug!(
            child = %front.path.display(),
            parent = %parent_path.display(),
            "following inherit"
        );

        let parent = SourceFile::load(&parent_path)?;
        chain.insert(0, parent);
    }
}

/// Resolve an `inherit` value against the directory of the file declaring it.
///
/// The value always uses `/` separators; each component is joined with
/// the host separator.
pub fn inherited_path(file: &Path, inherit: &str) -> PathBuf {
    let mut path = file.parent().map(Path::to_path_buf).unwrap_or_default();
    for component in inherit.split('/') {
        path.push(component);
    }
    path
}
