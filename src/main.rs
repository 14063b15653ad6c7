//! extbuild CLI
//!
//! Entry point for the `extbuild` command-line tool.

use clap::{Parser, Subcommand};
use extbuild::metadata::{self, Platform};
use extbuild::{files, logging, ChainedConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "extbuild")]
#[command(about = "Resolve browser extension metadata and collect package files", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration with the file defining each value
    Show {
        /// Configuration file to resolve
        file: PathBuf,

        /// Only print this section
        #[arg(long, short = 's')]
        section: Option<String>,

        /// Output the full snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the file that defines an option
    Source {
        /// Configuration file to resolve
        file: PathBuf,

        section: String,

        option: String,
    },

    /// Compute the build version and package file name
    Version {
        /// Extension base directory
        #[arg(long, short = 'b', default_value = ".")]
        base_dir: PathBuf,

        /// Target platform (default: the only platform with a metadata file)
        #[arg(long, short = 't')]
        platform: Option<Platform>,

        /// Release build (no build number suffix)
        #[arg(long, short = 'r')]
        release: bool,

        /// Build number (default: derived from repository history)
        #[arg(long, short = 'n')]
        build_num: Option<String>,

        /// Name the package as signed (crx, safariextz)
        #[arg(long)]
        signed: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List the files that would be packaged
    Files {
        /// Extension base directory
        #[arg(long, short = 'b', default_value = ".")]
        base_dir: PathBuf,

        /// Target platform (default: the only platform with a metadata file)
        #[arg(long, short = 't')]
        platform: Option<Platform>,

        /// Include development environment files
        #[arg(long)]
        devenv: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Build naming summary printed by `version --json`
#[derive(Serialize)]
struct BuildInfo {
    platform: Platform,
    version: String,
    file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    app_id: Option<String>,
}

/// A packaged file as printed by `files --json`
#[derive(Serialize)]
struct FileEntry<'a> {
    path: &'a str,
    size: usize,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Show { file, section, json } => {
            run_show(&file, section.as_deref(), json);
        }
        Commands::Source {
            file,
            section,
            option,
        } => {
            run_source(&file, &section, &option);
        }
        Commands::Version {
            base_dir,
            platform,
            release,
            build_num,
            signed,
            json,
        } => {
            run_version(&base_dir, platform, release, build_num, signed, json);
        }
        Commands::Files {
            base_dir,
            platform,
            devenv,
            json,
        } => {
            run_files(&base_dir, platform, devenv, json);
        }
    }
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, err);
    process::exit(1);
}

fn load_config(file: &Path) -> ChainedConfig {
    match ChainedConfig::from_file(file) {
        Ok(config) => config,
        Err(e) => fail("Error loading configuration", e),
    }
}

fn select_platform(base_dir: &Path, requested: Option<Platform>) -> Platform {
    match metadata::select_platform(base_dir, requested) {
        Ok(platform) => platform,
        Err(e) => fail("Error selecting platform", e),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail("Error serializing output", e),
    }
}

fn run_show(file: &Path, section: Option<&str>, json: bool) {
    let config = load_config(file);

    if json {
        match config.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => fail("Error serializing output", e),
        }
        return;
    }

    let sections: Vec<&str> = match section {
        Some(name) => vec![name],
        None => config.sections().collect(),
    };

    for name in sections {
        let items = match config.items(name) {
            Ok(items) => items,
            Err(e) => fail("Error reading section", e),
        };

        println!("[{}]", name);
        for item in items {
            println!("  {} = {}", item.name, item.value.replace('\n', "\n    "));
            println!("    # from {}", item.source.display());
        }
        println!();
    }
}

fn run_source(file: &Path, section: &str, option: &str) {
    let config = load_config(file);

    match config.option_source(section, option) {
        Ok(path) => println!("{}", path.display()),
        Err(e) => fail("Lookup error", e),
    }
}

fn run_version(
    base_dir: &Path,
    platform: Option<Platform>,
    release: bool,
    build_num: Option<String>,
    signed: bool,
    json: bool,
) {
    let platform = select_platform(base_dir, platform);
    let metadata = match metadata::read_metadata(base_dir, platform) {
        Ok(m) => m,
        Err(e) => fail("Error loading metadata", e),
    };

    let build_num = build_num.unwrap_or_else(|| metadata::build_number(base_dir));
    let version = match metadata::build_version(&metadata, release, &build_num) {
        Ok(v) => v,
        Err(e) => fail("Error computing version", e),
    };

    let extension = metadata::package_extension(platform, signed);
    let file_name = match metadata::default_file_name(&metadata, &version, extension) {
        Ok(name) => name,
        Err(e) => fail("Error computing file name", e),
    };

    let app_id = metadata::app_id(&metadata, release).ok().map(str::to_string);

    if json {
        print_json(&BuildInfo {
            platform,
            version,
            file_name,
            app_id,
        });
    } else {
        println!("Platform:  {}", platform);
        println!("Version:   {}", version);
        println!("File name: {}", file_name);
        if let Some(id) = app_id {
            println!("App ID:    {}", id);
        }
    }
}

fn run_files(base_dir: &Path, platform: Option<Platform>, devenv: bool, json: bool) {
    let platform = select_platform(base_dir, platform);
    let metadata = match metadata::read_metadata(base_dir, platform) {
        Ok(m) => m,
        Err(e) => fail("Error loading metadata", e),
    };

    let collected = match files::collect(base_dir, &metadata, devenv) {
        Ok(f) => f,
        Err(e) => fail("Error collecting files", e),
    };

    if json {
        let entries: Vec<FileEntry<'_>> = collected
            .iter()
            .map(|(path, data)| FileEntry {
                path,
                size: data.len(),
            })
            .collect();
        print_json(&entries);
    } else {
        if collected.is_empty() {
            println!("No files to package.");
            return;
        }

        println!("Package files ({} total):\n", collected.len());
        for (path, data) in collected.iter() {
            println!("  {} ({} bytes)", path, data.len());
        }
    }
}
