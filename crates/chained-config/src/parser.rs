//! Single-file parser for INI-style configuration files.
//!
//! Accepts `[section]` headers, `key = value` and `key: value` lines,
//! indented continuation lines, and `#`/`;` comments. Option names are
//! kept exactly as written; nothing is case folded.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::{INHERIT_OPTION, INHERIT_SECTION};

/// Options of one section, in the order they appear in the file.
pub type Options = IndexMap<String, String>;

/// Sections of one file, in the order they first appear.
pub type Sections = IndexMap<String, Options>;

/// A parsed configuration file: one link of an inheritance chain.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path the file was read from
    pub path: PathBuf,

    /// SHA-256 digest of the raw file bytes
    pub digest: String,

    /// Parsed sections and options
    pub sections: Sections,
}

impl SourceFile {
    /// Read and parse a file.
    ///
    /// A missing file is reported as [`ConfigError::Io`], never as a
    /// parse error, so callers can tell the two apart.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::io(path, e))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let text = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            ConfigError::Parse {
                path: path.to_path_buf(),
                line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
                message: format!("Invalid UTF-8: {}", e.utf8_error()),
            }
        })?;

        let sections = parse_str(path, &text)?;

        Ok(Self {
            path: path.to_path_buf(),
            digest,
            sections,
        })
    }

    /// The literal value of `default.inherit`, if this file declares a parent.
    pub fn inherit(&self) -> Option<&str> {
        self.sections
            .get(INHERIT_SECTION)
            .and_then(|options| options.get(INHERIT_OPTION))
            .map(|value| value.as_str())
    }
}

/// Parse configuration text. `path` is only used for error messages.
pub fn parse_str(path: &Path, text: &str) -> Result<Sections, ConfigError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut sections = Sections::new();
    let mut current_section: Option<String> = None;
    let mut current_option: Option<String> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;

        if line.trim().is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if is_rem_comment(line) {
            continue;
        }

        // Indented line: continuation of the previous value
        if line.starts_with(char::is_whitespace) {
            if let (Some(section), Some(option)) = (&current_section, &current_option) {
                let continued = line.trim();
                if !continued.is_empty() {
                    if let Some(value) = sections
                        .get_mut(section)
                        .and_then(|options| options.get_mut(option))
                    {
                        value.push('\n');
                        value.push_str(continued);
                    }
                }
                continue;
            }
        }

        if let Some(name) = parse_section_header(line) {
            sections.entry(name.to_string()).or_default();
            current_section = Some(name.to_string());
            current_option = None;
            continue;
        }

        let Some(section) = &current_section else {
            return Err(ConfigError::MissingSectionHeader {
                path: path.to_path_buf(),
                line: line_no,
            });
        };

        let (option, value) = parse_option_line(line).ok_or_else(|| ConfigError::Parse {
            path: path.to_path_buf(),
            line: line_no,
            message: format!("Unrecognised line: {:?}", line),
        })?;

        sections
            .entry(section.clone())
            .or_default()
            .insert(option.to_string(), value);
        current_option = Some(option.to_string());
    }

    Ok(sections)
}

/// `[name]` at the start of the line; anything after the `]` is ignored.
fn parse_section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let end = rest.find(']')?;
    if end == 0 {
        return None;
    }
    Some(&rest[..end])
}

/// Split `key = value` / `key: value` at the first delimiter.
fn parse_option_line(line: &str) -> Option<(&str, String)> {
    let delimiter = line.find(['=', ':'])?;
    let option = line[..delimiter].trim_end();
    if option.is_empty() || option.starts_with(char::is_whitespace) {
        return None;
    }

    // Only the first `;` can start a comment, and only after whitespace.
    // A `;` opening the value looks back at the value's last character.
    let mut value = line[delimiter + 1..].trim_start();
    if let Some(pos) = value.find(';') {
        let before = if pos == 0 {
            value.chars().last()
        } else {
            value[..pos].chars().last()
        };
        if before.is_some_and(char::is_whitespace) {
            value = &value[..pos];
        }
    }
    let value = value.trim();
    let value = if value == "\"\"" { "" } else { value };

    Some((option, value.to_string()))
}

fn is_rem_comment(line: &str) -> bool {
    line.starts_with(['r', 'R'])
        && line
            .split_whitespace()
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("rem"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Sections {
        parse_str(Path::new("test.cfg"), text).unwrap()
    }

    #[test]
    fn test_sections_and_options() {
        let sections = parse("[general]\nbasename = adblock\nversion: 1.2\n\n[mapping]\nlib/a.js = ../a.js\n");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections["general"]["basename"], "adblock");
        assert_eq!(sections["general"]["version"], "1.2");
        assert_eq!(sections["mapping"]["lib/a.js"], "../a.js");
    }

    #[test]
    fn test_option_names_keep_case() {
        let sections = parse("[general]\ntestScripts = a.js\nTESTSCRIPTS = b.js\n");

        assert_eq!(sections["general"]["testScripts"], "a.js");
        assert_eq!(sections["general"]["TESTSCRIPTS"], "b.js");
    }

    #[test]
    fn test_diff_operators_stay_in_option_name() {
        let sections = parse("[general]\nsources += c.js\nsources-=a.js\n");

        assert_eq!(sections["general"]["sources +"], "c.js");
        assert_eq!(sections["general"]["sources-"], "a.js");
    }

    #[test]
    fn test_comments_are_skipped() {
        let sections = parse("# leading\n; also\n[general]\nrem old comment\nkey = value ; trailing\nurl = http://a;b\n");

        assert_eq!(sections["general"].len(), 2);
        assert_eq!(sections["general"]["key"], "value");
        assert_eq!(sections["general"]["url"], "http://a;b");
    }

    #[test]
    fn test_semicolon_opening_value_is_kept() {
        let sections = parse("[a]\nk = ;x\nm = ;x ;y\nn = a;b ;c\n");

        assert_eq!(sections["a"]["k"], ";x");
        assert_eq!(sections["a"]["m"], ";x ;y");
        assert_eq!(sections["a"]["n"], "a;b ;c");
    }

    #[test]
    fn test_continuation_lines() {
        let sections = parse("[general]\nsources = a.js\n  b.js\n\n\tc.js\nother = x\n");

        assert_eq!(sections["general"]["sources"], "a.js\nb.js\nc.js");
        assert_eq!(sections["general"]["other"], "x");
    }

    #[test]
    fn test_repeated_section_header_continues_section() {
        let sections = parse("[a]\nx = 1\n[b]\ny = 2\n[a]\nz = 3\n");

        let names: Vec<&str> = sections["a"].keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["x", "z"]);
    }

    #[test]
    fn test_empty_quoted_value() {
        let sections = parse("[a]\nx = \"\"\ny =\n");

        assert_eq!(sections["a"]["x"], "");
        assert_eq!(sections["a"]["y"], "");
    }

    #[test]
    fn test_missing_section_header() {
        let err = parse_str(Path::new("bad.cfg"), "key = value\n").unwrap_err();

        assert!(matches!(
            err,
            ConfigError::MissingSectionHeader { line: 1, .. }
        ));
    }

    #[test]
    fn test_malformed_line_names_file_and_line() {
        let err = parse_str(Path::new("bad.cfg"), "[a]\nx = 1\nnot an option\n").unwrap_err();

        match err {
            ConfigError::Parse { path, line, .. } => {
                assert_eq!(path, PathBuf::from("bad.cfg"));
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceFile::load(&dir.path().join("absent.cfg")).unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_records_inherit_and_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("child.cfg");
        fs::write(&path, "[default]\ninherit = ../base.cfg\n").unwrap();

        let file = SourceFile::load(&path).unwrap();

        assert_eq!(file.inherit(), Some("../base.cfg"));
        assert_eq!(file.digest.len(), 64);
        assert_eq!(file.path, path);
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.cfg");
        fs::write(&path, b"[a]\nx = caf\xe9\n").unwrap();

        let err = SourceFile::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));
    }
}
