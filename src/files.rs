//! Package file collection
//!
//! Gathers the files that go into an extension package, keyed by their
//! `/`-separated path inside the package. Only top-level names listed as
//! included are picked up from the base directory, and any path with an
//! ignored component is dropped. Files named in the metadata's `mapping`
//! section are read from outside the base directory, relative to the
//! metadata file that declares them.

use chained_config::{ChainedConfig, Item};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::BuildError;

/// Top-level directories always packaged for Chrome-like platforms
const PACKAGE_DIRS: &[&str] = &["_locales", "icons", "jquery-ui", "lib", "skin", "ui", "ext"];

/// Top-level file extensions always packaged
const PACKAGE_EXTENSIONS: &[&str] = &["json", "js", "html", "xml"];

/// Names never packaged, at any depth
const IGNORED_FILES: &[&str] = &["store.description"];

/// Hook applied to every file as it is added
pub type ProcessFn = Box<dyn Fn(&str, Vec<u8>) -> Vec<u8>>;

/// Files of a package, sorted by package path
pub struct Files {
    entries: BTreeMap<String, Vec<u8>>,
    included: HashSet<String>,
    ignored: HashSet<String>,
    process: Option<ProcessFn>,
}

impl fmt::Debug for Files {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Files")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .field("included", &self.included)
            .field("ignored", &self.ignored)
            .field("process", &self.process.is_some())
            .finish()
    }
}

impl Files {
    /// Create an empty collection
    pub fn new(included: HashSet<String>, ignored: HashSet<String>) -> Self {
        Self {
            entries: BTreeMap::new(),
            included,
            ignored,
            process: None,
        }
    }

    /// Set a hook that may rewrite file contents as they are added
    pub fn with_process(mut self, process: ProcessFn) -> Self {
        self.process = Some(process);
        self
    }

    /// The first path component is one of the included names
    pub fn is_included(&self, relpath: &str) -> bool {
        relpath
            .split('/')
            .next()
            .is_some_and(|first| self.included.contains(first))
    }

    /// Any path component is one of the ignored names
    pub fn is_ignored(&self, relpath: &str) -> bool {
        relpath.split('/').any(|part| self.ignored.contains(part))
    }

    /// Add a file, running the processing hook first
    pub fn insert(&mut self, relpath: impl Into<String>, data: Vec<u8>) {
        let relpath = relpath.into();
        let data = match &self.process {
            Some(process) => process(&relpath, data),
            None => data,
        };
        self.entries.insert(relpath, data);
    }

    pub fn get(&self, relpath: &str) -> Option<&[u8]> {
        self.entries.get(relpath).map(Vec::as_slice)
    }

    pub fn contains(&self, relpath: &str) -> bool {
        self.entries.contains_key(relpath)
    }

    /// Package paths in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a file or directory into the package under `relpath`.
    ///
    /// Directory entries are kept if they are included, not ignored, and
    /// their package path is not listed in `skip`. A file is stored as is.
    pub fn read(&mut self, path: &Path, relpath: &str, skip: &[&str]) -> Result<(), BuildError> {
        if !path.is_dir() {
            return self.read_file(path, relpath);
        }

        let mut found: Vec<(PathBuf, String)> = Vec::new();
        let walker = WalkDir::new(path)
            .min_depth(1)
            .follow_links(true)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|entry| {
                let name = package_name(relpath, path, entry.path());
                self.is_included(&name) && !self.is_ignored(&name) && !skip.contains(&name.as_str())
            });

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() {
                found.push((
                    entry.path().to_path_buf(),
                    package_name(relpath, path, entry.path()),
                ));
            }
        }

        for (file, name) in found {
            self.read_file(&file, &name)?;
        }
        Ok(())
    }

    fn read_file(&mut self, path: &Path, relpath: &str) -> Result<(), BuildError> {
        let data = fs::read(path).map_err(|e| BuildError::io(path, e))?;
        if self.contains(relpath) {
            warn!("File {} defined multiple times", relpath);
        }
        self.insert(relpath, data);
        Ok(())
    }

    /// Read files listed as `target = source` mapping items.
    ///
    /// `source` uses `/` separators and is relative to the directory of
    /// the metadata file that defines the item. Sources that do not exist
    /// are reported and skipped.
    pub fn read_mapped_files(&mut self, mappings: &[Item<'_>]) -> Result<(), BuildError> {
        for item in mappings {
            let target = item.name;
            if target.contains('/') && self.is_ignored(target) {
                continue;
            }

            let mut path = item.source.parent().map(Path::to_path_buf).unwrap_or_default();
            for part in item.value.split('/') {
                path.push(part);
            }

            if path.exists() {
                debug!(package_path = target, source = %path.display(), "reading mapped file");
                self.read(&path, target, &[])?;
            } else {
                warn!("Mapped file {} doesn't exist", item.value);
            }
        }
        Ok(())
    }
}

/// Package path of `entry` found while walking `root` for `relpath`
fn package_name(relpath: &str, root: &Path, entry: &Path) -> String {
    let rel = entry.strip_prefix(root).unwrap_or(entry);
    let mut name = relpath.to_string();
    for component in rel.components() {
        if !name.is_empty() {
            name.push('/');
        }
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}

/// Top-level names included in a package built from `base_dir`.
pub fn package_files(base_dir: &Path, devenv: bool) -> Result<HashSet<String>, BuildError> {
    let mut result: HashSet<String> = PACKAGE_DIRS.iter().map(|s| s.to_string()).collect();
    if devenv {
        result.insert("qunit".to_string());
    }

    let entries = fs::read_dir(base_dir).map_err(|e| BuildError::io(base_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(base_dir, e))?;
        let path = entry.path();
        let packaged = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| PACKAGE_EXTENSIONS.contains(&ext));
        if packaged {
            result.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }

    Ok(result)
}

/// Names excluded from every package
pub fn ignored_files() -> HashSet<String> {
    IGNORED_FILES.iter().map(|s| s.to_string()).collect()
}

/// Collect the package files for `base_dir`: mapped files first, then the
/// base directory itself, skipping paths already provided by a mapping.
pub fn collect(
    base_dir: &Path,
    metadata: &ChainedConfig,
    devenv: bool,
) -> Result<Files, BuildError> {
    let mapped = if metadata.has_section("mapping") {
        metadata.items("mapping")?
    } else {
        Vec::new()
    };

    let mut files = Files::new(package_files(base_dir, devenv)?, ignored_files());
    files.read_mapped_files(&mapped)?;

    let skip: Vec<&str> = mapped.iter().map(|item| item.name).collect();
    files.read(base_dir, "", &skip)?;

    Ok(files)
}
