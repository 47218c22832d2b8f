//! Batch orchestration: extract many files, then write one track
//!
//! Per-file failures are collected rather than propagated, so one bad image
//! never aborts a batch.

use crate::error::PixTrailError;
use crate::parser::metadata::extract_with_trace;
use crate::types::{ExtractOptions, GpsRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[cfg(feature = "cli")]
use crate::discovery::{default_output_path, find_image_files};
#[cfg(feature = "cli")]
use crate::export::{export_to_gpx, ExportOptions, ExportReport};
#[cfg(feature = "cli")]
use crate::Result;

/// Outcome of extracting a batch of files
#[derive(Debug, Default)]
pub struct CollectReport {
    /// Number of paths examined
    pub scanned: usize,
    /// Records in input order
    pub records: Vec<GpsRecord>,
    /// Files that were readable but carried no location
    pub without_gps: Vec<PathBuf>,
    /// Files that could not be examined at all
    pub failed: Vec<(PathBuf, PixTrailError)>,
}

/// Extract GPS records from each path, skipping files that fail
pub fn collect_gps_records<P: AsRef<Path>>(paths: &[P], options: &ExtractOptions) -> CollectReport {
    let mut report = CollectReport {
        scanned: paths.len(),
        ..CollectReport::default()
    };

    for path in paths {
        let path = path.as_ref();
        match extract_with_trace(path, options) {
            Ok(extraction) => match extraction.record {
                Some(record) => {
                    debug!(
                        "Found GPS data in {}: {}, {}",
                        path.display(),
                        record.latitude,
                        record.longitude
                    );
                    report.records.push(record);
                }
                None => report.without_gps.push(path.to_path_buf()),
            },
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                report.failed.push((path.to_path_buf(), e));
            }
        }
    }

    info!(
        "Found GPS data in {} of {} files",
        report.records.len(),
        report.scanned
    );
    report
}

/// Scan a directory and extract GPS records from every image in it
#[cfg(feature = "cli")]
pub fn process_directory(
    dir: &Path,
    recursive: bool,
    options: &ExtractOptions,
) -> Result<CollectReport> {
    let files = find_image_files(dir, recursive)?;
    info!("Found {} image files to process", files.len());
    Ok(collect_gps_records(&files, options))
}

/// Scan a directory and write its GPS records to a GPX file
///
/// `output` defaults to [`default_output_path`] for `dir`.
///
/// # Errors
/// - `NotFound` when `dir` does not exist
/// - `EmptyInput` when no image carried usable GPS data
/// - `Io` when the GPX file cannot be written
#[cfg(feature = "cli")]
pub fn process_and_generate(
    dir: &Path,
    output: Option<&Path>,
    recursive: bool,
    extract_options: &ExtractOptions,
    export_options: &ExportOptions,
) -> Result<(CollectReport, ExportReport)> {
    let collected = process_directory(dir, recursive, extract_options)?;
    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(dir, None),
    };
    let exported = export_to_gpx(&collected.records, &output_path, export_options)?;
    Ok((collected, exported))
}
