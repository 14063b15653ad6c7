//! Read-only view of a merged configuration.

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::document::{ConfigDocument, ConfigValue};
use crate::error::ConfigError;
use crate::loader::ConfigLoader;
use crate::snapshot::{ConfigSnapshot, SnapshotValue, SCHEMA_ID, SCHEMA_VERSION};

/// A file that took part in building the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Absolute path of the file
    pub path: PathBuf,

    /// SHA-256 digest of the raw file bytes
    pub digest: String,
}

/// One option of a section, as returned by [`ChainedConfig::items`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item<'a> {
    pub name: &'a str,
    pub value: &'a str,
    /// File that defines the value; relative paths in `value` are
    /// usually resolved against its directory
    pub source: &'a Path,
}

/// Merged configuration with per-option provenance.
///
/// There are no mutating methods: values can only come from files merged
/// by a [`ConfigLoader`], so recorded sources never go stale.
#[derive(Debug, Clone)]
pub struct ChainedConfig {
    document: ConfigDocument,
    sources: Vec<ConfigSource>,
}

impl ChainedConfig {
    pub(crate) fn new(document: ConfigDocument, sources: Vec<ConfigSource>) -> Self {
        Self { document, sources }
    }

    /// Load a single file and its inheritance chain. The file must exist.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut loader = ConfigLoader::new();
        if loader.read([path])?.is_empty() {
            return Err(ConfigError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            ));
        }
        Ok(loader.finish())
    }

    /// Load several top-level files, skipping those that do not exist.
    pub fn load<I, P>(paths: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut loader = ConfigLoader::new();
        loader.read(paths)?;
        Ok(loader.finish())
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.document.section_names()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.document.section(section).is_some()
    }

    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.document.value(section, option).is_some()
    }

    /// Option names of a section.
    pub fn options(&self, section: &str) -> Result<Vec<&str>, ConfigError> {
        let options = self.section(section)?;
        Ok(options.keys().map(String::as_str).collect())
    }

    /// All options of a section with their values and defining files.
    pub fn items(&self, section: &str) -> Result<Vec<Item<'_>>, ConfigError> {
        let options = self.section(section)?;
        Ok(options
            .iter()
            .map(|(name, value)| Item {
                name: name.as_str(),
                value: value.value.as_str(),
                source: value.defined_in.as_path(),
            })
            .collect())
    }

    /// The file whose plain assignment defines the option's current value.
    ///
    /// Files that only applied `+=`/`-=` to the option are never returned.
    pub fn option_source(&self, section: &str, option: &str) -> Result<&Path, ConfigError> {
        Ok(self.lookup(section, option)?.defined_in.as_path())
    }

    pub fn get(&self, section: &str, option: &str) -> Result<&str, ConfigError> {
        Ok(self.lookup(section, option)?.value.as_str())
    }

    /// Like [`get`](Self::get) but `None` for a missing section or option.
    pub fn get_opt(&self, section: &str, option: &str) -> Option<&str> {
        self.document
            .value(section, option)
            .map(|v| v.value.as_str())
    }

    /// The value split on whitespace.
    pub fn get_list(&self, section: &str, option: &str) -> Result<Vec<&str>, ConfigError> {
        Ok(self.get(section, option)?.split_whitespace().collect())
    }

    /// `1`, `yes`, `true`, `on` and `0`, `no`, `false`, `off`, in any case.
    pub fn get_bool(&self, section: &str, option: &str) -> Result<bool, ConfigError> {
        let value = self.get(section, option)?;
        match value.to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(true),
            "0" | "no" | "false" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBoolean {
                section: section.to_string(),
                option: option.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn get_int(&self, section: &str, option: &str) -> Result<i64, ConfigError> {
        let value = self.get(section, option)?;
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidInteger {
                section: section.to_string(),
                option: option.to_string(),
                value: value.to_string(),
            })
    }

    /// Every file merged into this configuration, ancestors first.
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// Serializable view of every value with its defining file.
    pub fn snapshot(&self) -> ConfigSnapshot {
        let sections = self
            .document
            .iter()
            .map(|(name, options)| {
                let values: IndexMap<String, SnapshotValue> = options
                    .iter()
                    .map(|(option, value)| {
                        (
                            option.clone(),
                            SnapshotValue {
                                value: value.value.clone(),
                                source: value.defined_in.clone(),
                            },
                        )
                    })
                    .collect();
                (name.to_string(), values)
            })
            .collect();

        ConfigSnapshot {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            sections,
            sources: self.sources.clone(),
        }
    }

    /// Snapshot serialized as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    fn section(&self, section: &str) -> Result<&IndexMap<String, ConfigValue>, ConfigError> {
        self.document
            .section(section)
            .ok_or_else(|| ConfigError::NoSuchSection(section.to_string()))
    }

    fn lookup(&self, section: &str, option: &str) -> Result<&ConfigValue, ConfigError> {
        self.section(section)?
            .get(option)
            .ok_or_else(|| ConfigError::NoSuchOption {
                section: section.to_string(),
                option: option.to_string(),
            })
    }
}
