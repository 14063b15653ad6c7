//! End-to-end resolution of inheritance chains on disk.

use chained_config::{ChainedConfig, ConfigError, ConfigLoader, MAX_CHAIN_LENGTH};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, text).unwrap();
    path
}

/// Writes `link0.cfg` .. `link{n-1}.cfg`, each inheriting from the previous
/// one, and returns the path of the last.
fn write_linear_chain(dir: &Path, n: usize) -> PathBuf {
    let mut last = write(dir, "link0.cfg", "[general]\nlist = base\n");
    for i in 1..n {
        last = write(
            dir,
            &format!("link{i}.cfg"),
            &format!("[default]\ninherit = link{}.cfg\n[general]\nlist += t{i}\n", i - 1),
        );
    }
    last
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_base_and_child_scenario() {
    let dir = TempDir::new().unwrap();
    let base = write(dir.path(), "base.cfg", "[general]\nsources = a.js b.js\n[default]\n");
    let child = write(
        dir.path(),
        "child.cfg",
        "[default]\ninherit = base.cfg\n[general]\nsources += c.js\nsources -= a.js\n",
    );

    let config = ChainedConfig::from_file(&child).unwrap();

    assert_eq!(config.get("general", "sources").unwrap(), "b.js c.js");
    assert_eq!(config.option_source("general", "sources").unwrap(), base);
    assert_eq!(config.option_source("default", "inherit").unwrap(), child);
}

#[test]
fn test_parent_child_append() {
    let dir = TempDir::new().unwrap();
    let parent = write(dir.path(), "p.cfg", "[s]\nopt = a b\n");
    let child = write(dir.path(), "c.cfg", "[default]\ninherit = p.cfg\n[s]\nopt += c\n");

    let config = ChainedConfig::from_file(&child).unwrap();

    assert_eq!(config.get("s", "opt").unwrap(), "a b c");
    assert_eq!(config.option_source("s", "opt").unwrap(), parent);
}

#[test]
fn test_provenance_follows_last_plain_assignment() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "root.cfg", "[s]\nopt = a\n");
    let middle = write(
        dir.path(),
        "middle.cfg",
        "[default]\ninherit = root.cfg\n[s]\nopt = x y\n",
    );
    let leaf = write(
        dir.path(),
        "leaf.cfg",
        "[default]\ninherit = middle.cfg\n[s]\nopt += z\nopt -= x\n",
    );

    let config = ChainedConfig::from_file(&leaf).unwrap();

    assert_eq!(config.get("s", "opt").unwrap(), "y z");
    assert_eq!(config.option_source("s", "opt").unwrap(), middle);
}

#[test]
fn test_repeated_additions_never_duplicate() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.cfg", "[s]\nopt = p\n");
    write(dir.path(), "b.cfg", "[default]\ninherit = a.cfg\n[s]\nopt += x y\n");
    write(dir.path(), "c.cfg", "[default]\ninherit = b.cfg\n[s]\nopt += x x p\n");
    let d = write(dir.path(), "d.cfg", "[default]\ninherit = c.cfg\n[s]\nopt -= y\n");

    let config = ChainedConfig::from_file(&d).unwrap();

    assert_eq!(config.get_list("s", "opt").unwrap(), vec!["p", "x"]);
}

#[test]
fn test_ancestor_only_sections_survive() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.cfg", "[mapping]\nlib/x.js = x.js\n");
    let child = write(
        dir.path(),
        "child.cfg",
        "[default]\ninherit = base.cfg\n[general]\nbasename = ext\n",
    );

    let config = ChainedConfig::from_file(&child).unwrap();

    let items = config.items("mapping").unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "lib/x.js");
    assert_eq!(items[0].source, dir.path().join("base.cfg"));
}

#[test]
fn test_inherit_through_subdirectories() {
    let dir = TempDir::new().unwrap();
    let common = write(dir.path(), "shared/metadata.common", "[general]\nbasename = ext\n");
    write(
        dir.path(),
        "shared/nested/metadata.mid",
        "[default]\ninherit = ../metadata.common\n",
    );
    let top = write(
        dir.path(),
        "metadata.chrome",
        "[default]\ninherit = shared/nested/metadata.mid\n",
    );

    let config = ChainedConfig::from_file(&top).unwrap();

    let source = config.option_source("general", "basename").unwrap();
    assert_eq!(source, dir.path().join("shared/nested/../metadata.common"));
    assert_eq!(fs::canonicalize(source).unwrap(), fs::canonicalize(common).unwrap());
}

// =============================================================================
// Chain length
// =============================================================================

#[test]
fn test_five_link_chain_is_accepted() {
    let dir = TempDir::new().unwrap();
    let last = write_linear_chain(dir.path(), MAX_CHAIN_LENGTH);

    let config = ChainedConfig::from_file(&last).unwrap();

    assert_eq!(config.get("general", "list").unwrap(), "base t1 t2 t3 t4");
    assert_eq!(config.sources().len(), MAX_CHAIN_LENGTH);
}

#[test]
fn test_six_link_chain_is_rejected() {
    let dir = TempDir::new().unwrap();
    let last = write_linear_chain(dir.path(), MAX_CHAIN_LENGTH + 1);

    let err = ChainedConfig::from_file(&last).unwrap_err();

    match err {
        ConfigError::ChainTooLong { path, limit } => {
            assert_eq!(limit, MAX_CHAIN_LENGTH);
            assert_eq!(path, dir.path().join("link1.cfg"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_two_file_cycle_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.cfg", "[default]\ninherit = b.cfg\n");
    let b = write(dir.path(), "b.cfg", "[default]\ninherit = a.cfg\n");

    let err = ChainedConfig::from_file(&b).unwrap_err();

    assert!(matches!(err, ConfigError::ChainTooLong { .. }));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_diff_against_unknown_option() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.cfg", "[general]\nother = 1\n");
    let child = write(
        dir.path(),
        "child.cfg",
        "[default]\ninherit = base.cfg\n[general]\nsources += c.js\n",
    );

    let err = ChainedConfig::from_file(&child).unwrap_err();

    match err {
        ConfigError::DiffForUnknownOption { section, option } => {
            assert_eq!(section, "general");
            assert_eq!(option, "sources");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_ancestor_fails_the_read() {
    let dir = TempDir::new().unwrap();
    let child = write(dir.path(), "child.cfg", "[default]\ninherit = gone.cfg\n");

    let mut loader = ConfigLoader::new();
    let err = loader.read([&child]).unwrap_err();

    match err {
        ConfigError::Io { path, .. } => assert_eq!(path, dir.path().join("gone.cfg")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_parse_error_in_ancestor_names_file() {
    let dir = TempDir::new().unwrap();
    let base = write(dir.path(), "base.cfg", "[general]\nthis is not valid\n");
    let child = write(dir.path(), "child.cfg", "[default]\ninherit = base.cfg\n");

    let err = ChainedConfig::from_file(&child).unwrap_err();

    match err {
        ConfigError::Parse { path, line, .. } => {
            assert_eq!(path, base);
            assert_eq!(line, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}
