//! Merged configuration document and the diff-merge engine.
//!
//! Merge semantics, applied one file at a time, root ancestor first:
//! - Sections: created on first sight, never removed
//! - `option = value`: replaces the value and records the file as its source
//! - `option += tokens`: appends tokens not yet present, source unchanged
//! - `option -= tokens`: drops matching tokens, source unchanged

use indexmap::IndexMap;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::parser::SourceFile;

/// A stored option value together with the file that defined it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue {
    /// Current value after all diffs
    pub value: String,

    /// File whose plain assignment produced the base of this value
    pub defined_in: PathBuf,
}

/// A list diff parsed from an option name ending in `+` or `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    Add,
    Remove,
}

impl DiffOp {
    /// Split an option name into its base name and diff operator.
    ///
    /// `"sources +"` yields `("sources", Some(Add))`, `"sources"` yields
    /// `("sources", None)`.
    pub fn split(option: &str) -> (&str, Option<DiffOp>) {
        let op = if option.ends_with('+') {
            DiffOp::Add
        } else if option.ends_with('-') {
            DiffOp::Remove
        } else {
            return (option, None);
        };
        (option[..option.len() - 1].trim_end(), Some(op))
    }

    /// Apply this diff to a whitespace-separated token list.
    pub fn apply(self, current: &str, diff: &str) -> String {
        let mut tokens: Vec<&str> = current.split_whitespace().collect();
        match self {
            DiffOp::Add => {
                for token in diff.split_whitespace() {
                    if !tokens.contains(&token) {
                        tokens.push(token);
                    }
                }
            }
            DiffOp::Remove => {
                let removed: Vec<&str> = diff.split_whitespace().collect();
                tokens.retain(|token| !removed.contains(token));
            }
        }
        tokens.join(" ")
    }
}

/// Section name → option name → value, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    sections: IndexMap<String, IndexMap<String, ConfigValue>>,
}

impl ConfigDocument {
    /// Merge one file onto the document.
    pub(crate) fn merge_file(&mut self, file: &SourceFile) -> Result<(), ConfigError> {
        for (section, options) in &file.sections {
            let target = self.sections.entry(section.clone()).or_default();

            for (option, value) in options {
                match DiffOp::split(option) {
                    (name, Some(op)) => {
                        let existing = target.get_mut(name).ok_or_else(|| {
                            ConfigError::DiffForUnknownOption {
                                section: section.clone(),
                                option: name.to_string(),
                            }
                        })?;
                        existing.value = op.apply(&existing.value, value);
                    }
                    (name, None) => {
                        target.insert(
                            name.to_string(),
                            ConfigValue {
                                value: value.clone(),
                                defined_in: file.path.clone(),
                            },
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Merge a resolved chain, root ancestor first.
    pub(crate) fn merge_chain(&mut self, chain: &[SourceFile]) -> Result<(), ConfigError> {
        chain.iter().try_for_each(|file| self.merge_file(file))
    }

    pub fn section(&self, section: &str) -> Option<&IndexMap<String, ConfigValue>> {
        self.sections.get(section)
    }

    pub fn value(&self, section: &str, option: &str) -> Option<&ConfigValue> {
        self.sections.get(section)?.get(option)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, ConfigValue>)> {
        self.sections.iter().map(|(name, options)| (name.as_str(), options))
    }
}
