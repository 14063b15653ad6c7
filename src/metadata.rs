//! Platform metadata lookup and build naming
//!
//! Each platform reads `metadata.<platform>` from the extension's base
//! directory. The file usually inherits shared settings from a common
//! metadata file; see [`chained_config`] for the inheritance rules.

use chained_config::ChainedConfig;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use tracing::debug;

use crate::error::BuildError;

/// Target browser platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Chrome,
    Gecko,
    Edge,
    Safari,
    KMeleon,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Chrome,
        Platform::Gecko,
        Platform::Edge,
        Platform::Safari,
        Platform::KMeleon,
    ];

    /// Name used in metadata file names and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Gecko => "gecko",
            Self::Edge => "edge",
            Self::Safari => "safari",
            Self::KMeleon => "kmeleon",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| BuildError::UnknownPlatform(s.to_string()))
    }
}

/// `<base_dir>/metadata.<platform>`
pub fn metadata_path(base_dir: &Path, platform: Platform) -> PathBuf {
    base_dir.join(format!("metadata.{}", platform))
}

/// `<base_dir>/devenv.<platform>`
pub fn devenv_path(base_dir: &Path, platform: Platform) -> PathBuf {
    base_dir.join(format!("devenv.{}", platform))
}

/// Platforms with a metadata file in `base_dir`, in [`Platform::ALL`] order.
pub fn available_platforms(base_dir: &Path) -> Vec<Platform> {
    Platform::ALL
        .into_iter()
        .filter(|platform| metadata_path(base_dir, *platform).is_file())
        .collect()
}

/// Choose the platform to build for.
///
/// A requested platform must have a metadata file. Without a request the
/// only available platform is used; with several the caller has to pick.
pub fn select_platform(
    base_dir: &Path,
    requested: Option<Platform>,
) -> Result<Platform, BuildError> {
    let available = available_platforms(base_dir);

    match (requested, available.as_slice()) {
        (_, []) => Err(BuildError::NoMetadata {
            base_dir: base_dir.to_path_buf(),
        }),
        (Some(platform), _) if available.contains(&platform) => Ok(platform),
        (Some(platform), _) => Err(BuildError::MissingPlatformMetadata {
            platform,
            path: metadata_path(base_dir, platform),
        }),
        (None, [only]) => Ok(*only),
        (None, _) => Err(BuildError::PlatformRequired {
            available: available
                .iter()
                .map(|platform| platform.name())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// Resolve the platform's metadata file.
///
/// A missing metadata file yields an empty configuration rather than an
/// error; lookups on it then fail with `NoSuchSection`.
pub fn read_metadata(base_dir: &Path, platform: Platform) -> Result<ChainedConfig, BuildError> {
    let path = metadata_path(base_dir, platform);
    Ok(ChainedConfig::load([&path])?)
}

/// File extension of the package produced for a platform.
pub fn package_extension(platform: Platform, signed: bool) -> &'static str {
    match (platform, signed) {
        (Platform::Edge, _) => "appx",
        (Platform::Gecko, _) => "xpi",
        (Platform::Chrome, true) => "crx",
        (Platform::Safari, true) => "safariextz",
        (Platform::Chrome | Platform::Safari | Platform::KMeleon, _) => "zip",
    }
}

/// `<basename>-<version>.<ext>`
pub fn default_file_name(
    metadata: &ChainedConfig,
    version: &str,
    extension: &str,
) -> Result<String, BuildError> {
    let basename = metadata.get("general", "basename")?;
    Ok(format!("{}-{}.{}", basename, version, extension))
}

/// `general.<prefix>_release` for release builds, `general.<prefix>_devbuild` otherwise.
pub fn build_specific_option<'a>(
    metadata: &'a ChainedConfig,
    release: bool,
    prefix: &str,
) -> Result<&'a str, BuildError> {
    let suffix = if release { "release" } else { "devbuild" };
    Ok(metadata.get("general", &format!("{}_{}", prefix, suffix))?)
}

pub fn app_id(metadata: &ChainedConfig, release: bool) -> Result<&str, BuildError> {
    build_specific_option(metadata, release, "app_id")
}

/// Build number derived from the repository history, `"0"` if unavailable.
pub fn build_number(base_dir: &Path) -> String {
    let output = if base_dir.join(".hg").is_dir() {
        Command::new("hg")
            .args(["id", "-n", "-R"])
            .arg(base_dir)
            .output()
            .ok()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .chars()
                    .filter(char::is_ascii_digit)
                    .collect::<String>()
            })
    } else if base_dir.join(".git").exists() {
        Command::new("git")
            .args(["rev-list", "--count", "--branches", "--tags"])
            .current_dir(base_dir)
            .output()
            .ok()
            .filter(|o| o.status.success())
            .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
    } else {
        None
    };

    match output {
        Some(num) if !num.is_empty() => num,
        _ => {
            debug!(base_dir = %base_dir.display(), "no build number available");
            "0".to_string()
        }
    }
}

/// Version string for a build.
///
/// Release builds use `general.version` as is. Development builds append
/// the build number; a purely numeric version is first padded to three
/// components, so `1.2` with build `345` becomes `1.2.0.345`.
pub fn build_version(
    metadata: &ChainedConfig,
    release: bool,
    build_num: &str,
) -> Result<String, BuildError> {
    let mut version = metadata.get("general", "version")?.to_string();

    if !release && !build_num.is_empty() {
        let numeric_tail = Regex::new(r"(^|\.)\d+$").unwrap();
        if numeric_tail.is_match(&version) {
            while version.matches('.').count() < 2 {
                version.push_str(".0");
            }
        }
        version.push('.');
        version.push_str(build_num);
    }

    Ok(version)
}
