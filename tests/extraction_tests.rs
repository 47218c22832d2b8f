//! Integration tests for GPS extraction
//!
//! Covers the backend chain end to end on files written to disk:
//! - Standard JPEG decoded by the container reader
//! - Damaged container recovered by the segment scanner
//! - Photos and files without GPS data
//! - Missing-time policies

mod common;

use chrono::{TimeZone, Utc};
use common::{jpeg, tiff, write_photo, PhotoGps};
use pixtrail::{
    extract_gps_data, extract_with_options, extract_with_trace, AttemptOutcome, Backend,
    ExtractOptions, MissingTime, PixTrailError,
};
use std::fs;
use tempfile::TempDir;

const TOLERANCE: f64 = 1e-6;

#[test]
fn test_extract_berlin_jpeg() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_photo(temp_dir.path(), "IMG_0001.jpg", Some(PhotoGps::berlin()));

    let record = extract_gps_data(&path)
        .expect("Extraction should not fail")
        .expect("Photo should carry GPS data");

    assert!((record.latitude - 52.5).abs() < TOLERANCE);
    assert!((record.longitude - 13.4).abs() < TOLERANCE);
    assert!((record.altitude - 100.0).abs() < TOLERANCE);
    assert_eq!(
        record.timestamp,
        Some(Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap())
    );
    assert_eq!(record.source_name, "IMG_0001.jpg");
}

#[test]
fn test_extract_southern_hemisphere_below_sea_level() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_photo(temp_dir.path(), "sydney.jpg", Some(PhotoGps::sydney()));

    let record = extract_gps_data(&path).unwrap().unwrap();
    assert!((record.latitude + 33.868_819_4).abs() < 1e-5);
    assert!((record.longitude - 151.209_294_4).abs() < 1e-5);
    assert!((record.altitude + 5.0).abs() < TOLERANCE);
}

#[test]
fn test_container_backend_decodes_first() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_photo(temp_dir.path(), "a.jpg", Some(PhotoGps::berlin()));

    let extraction = extract_with_trace(&path, &ExtractOptions::default()).unwrap();
    assert_eq!(extraction.decoded_by(), Some(Backend::Container));
    assert_eq!(extraction.attempts.len(), 1);
}

#[test]
fn test_segment_scan_recovers_damaged_container() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("damaged.jpg");

    // Leading garbage hides the JPEG signature from the container reader
    let mut bytes = b"garbage before the image".to_vec();
    bytes.extend(jpeg(&tiff(Some(PhotoGps::berlin()))));
    fs::write(&path, bytes).unwrap();

    let extraction = extract_with_trace(&path, &ExtractOptions::default()).unwrap();
    assert_eq!(extraction.decoded_by(), Some(Backend::SegmentScan));
    assert!(matches!(
        extraction.attempts[0].outcome,
        AttemptOutcome::Failed(_)
    ));

    let record = extraction.record.unwrap();
    assert!((record.latitude - 52.5).abs() < TOLERANCE);
    assert!((record.longitude - 13.4).abs() < TOLERANCE);
}

#[test]
fn test_plain_tiff_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("scan.tif");
    fs::write(&path, tiff(Some(PhotoGps::berlin()))).unwrap();

    let record = extract_gps_data(&path).unwrap().unwrap();
    assert!((record.latitude - 52.5).abs() < TOLERANCE);
    assert_eq!(record.source_name, "scan.tif");
}

#[test]
fn test_photo_without_gps_returns_none() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_photo(temp_dir.path(), "nogps.jpg", None);

    let extraction = extract_with_trace(&path, &ExtractOptions::default()).unwrap();
    assert!(extraction.record.is_none());
    assert!(!extraction.all_failed());
    assert_eq!(extraction.attempts.len(), 2);
    assert!(extraction
        .attempts
        .iter()
        .all(|a| matches!(a.outcome, AttemptOutcome::NoGps)));
}

#[test]
fn test_non_image_returns_none() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("notes.jpg");
    fs::write(&path, "just some text").unwrap();

    assert_eq!(extract_gps_data(&path).unwrap(), None);
    let extraction = extract_with_trace(&path, &ExtractOptions::default()).unwrap();
    assert!(extraction.all_failed());
}

#[test]
fn test_missing_file_is_not_found() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("missing.jpg");

    assert!(matches!(
        extract_gps_data(&path),
        Err(PixTrailError::NotFound(p)) if p == path
    ));
}

#[test]
fn test_missing_time_policies() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_photo(
        temp_dir.path(),
        "untimed.jpg",
        Some(PhotoGps::berlin().with_datetime(None)),
    );

    let unknown = extract_gps_data(&path).unwrap().unwrap();
    assert_eq!(unknown.timestamp, None);

    let before = Utc::now();
    let now = extract_with_options(
        &path,
        &ExtractOptions {
            missing_time: MissingTime::Now,
        },
    )
    .unwrap()
    .unwrap();
    let stamped = now.timestamp.expect("Now policy should fill the time");
    assert!(stamped >= before);
}
