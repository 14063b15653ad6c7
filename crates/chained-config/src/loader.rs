//! Builder that reads top-level files and merges their chains.

use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::chain::resolve_chain;
use crate::config::{ChainedConfig, ConfigSource};
use crate::document::ConfigDocument;
use crate::error::ConfigError;
use crate::parser::SourceFile;

/// Accumulates configuration files into a [`ChainedConfig`].
///
/// This is the only place where the merged document is mutated. Call
/// [`read`](Self::read) as often as needed, then [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct ConfigLoader {
    document: ConfigDocument,
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read top-level files in order, each with its full inheritance chain.
    ///
    /// Top-level files that do not exist are skipped. The returned list
    /// holds the paths that were actually loaded, as given. Any other
    /// failure, including a missing ancestor, aborts the call; the file
    /// that failed contributes nothing.
    pub fn read<I, P>(&mut self, paths: I) -> Result<Vec<PathBuf>, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut read_ok = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if self.read_one(path)? {
                read_ok.push(path.to_path_buf());
            }
        }

        Ok(read_ok)
    }

    /// Read a single top-level file. Returns `false` if it does not exist.
    fn read_one(&mut self, path: &Path) -> Result<bool, ConfigError> {
        let absolute = absolute_path(path)?;

        let start = match SourceFile::load(&absolute) {
            Ok(file) => file,
            Err(e) if e.is_not_found() => {
                debug!(path = %absolute.display(), "skipping missing config file");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let chain = resolve_chain(start)?;

        let mut document = self.document.clone();
        document.merge_chain(&chain)?;
        self.document = document;

        for link in &chain {
            if !self.sources.iter().any(|s| s.path == link.path) {
                self.sources.push(ConfigSource {
                    path: link.path.clone(),
                    digest: link.digest.clone(),
                });
            }
        }

        debug!(
            path = %absolute.display(),
            chain_length = chain.len(),
            "loaded config file"
        );
        Ok(true)
    }

    /// Freeze the merged document.
    pub fn finish(self) -> ChainedConfig {
        ChainedConfig::new(self.document, self.sources)
    }
}

/// Make `path` absolute against the current directory without touching
/// the file system otherwise.
fn absolute_path(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().map_err(|e| ConfigError::io(path, e))?;
    Ok(cwd.join(path))
}
