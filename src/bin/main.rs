//! CLI binary for PixTrail
//!
//! Scans a directory of photos and writes their GPS locations to a GPX file.

use anyhow::Result;
use clap::{Arg, Command};
use pixtrail::{
    process_and_generate, ExportOptions, ExtractOptions, MissingTime, PixTrailError,
    DEFAULT_CREATOR,
};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

fn version() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();
    VERSION.get_or_init(|| match option_env!("VERGEN_GIT_SHA") {
        Some(sha) if !sha.is_empty() => format!("{} ({sha})", env!("CARGO_PKG_VERSION")),
        _ => env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "pixtrail=debug" } else { "pixtrail=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let matches = Command::new("PixTrail")
        .version(version())
        .about("Extract GPS data from photos and create a GPX track.")
        .arg(
            Arg::new("input_dir")
                .help("Directory containing photos")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output GPX file (default: <input_dir>/<dir name>.gpx)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Search for photos in subdirectories")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .visible_alias("debug")
                .help("Enable verbose output and per-file extraction details")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("assume-now")
                .long("assume-now")
                .help("Use the current time for photos without a capture time (default: leave the time empty)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("creator")
                .long("creator")
                .help("Creator attribute of the GPX document")
                .value_name("TEXT")
                .default_value(DEFAULT_CREATOR),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    init_logging(verbose);

    let Some(input_dir) = matches.get_one::<PathBuf>("input_dir") else {
        eprintln!("Error: No input directory given.");
        std::process::exit(1);
    };
    let output = matches.get_one::<PathBuf>("output").map(PathBuf::as_path);
    let recursive = matches.get_flag("recursive");

    let extract_options = ExtractOptions {
        missing_time: if matches.get_flag("assume-now") {
            MissingTime::Now
        } else {
            MissingTime::Unknown
        },
    };
    let export_options = ExportOptions {
        creator: matches
            .get_one::<String>("creator")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CREATOR.to_string()),
    };

    println!("Processing photos in: {}", input_dir.display());

    match process_and_generate(
        input_dir,
        output,
        recursive,
        &extract_options,
        &export_options,
    ) {
        Ok((collected, exported)) => {
            println!(
                "Found GPS data in {} of {} files",
                collected.records.len(),
                collected.scanned
            );
            if verbose {
                for path in &collected.without_gps {
                    println!("  No GPS data: {}", display_name(path));
                }
            }
            for (path, e) in &collected.failed {
                eprintln!("Warning: Could not read {}: {e}", display_name(path));
            }
            println!(
                "GPX file created: {} ({} waypoints, {} track points)",
                exported.gpx_path.display(),
                exported.waypoint_count,
                exported.track_point_count
            );
            Ok(())
        }
        Err(PixTrailError::EmptyInput) => {
            eprintln!("Error: No GPS data found in any photo.");
            eprintln!("This could be due to:");
            eprintln!("  - Photos taken with location services disabled");
            eprintln!("  - Metadata stripped by an editor or messaging app");
            eprintln!("  - Photos in subdirectories (use --recursive)");
            eprintln!("Use --verbose flag for more detailed information.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
