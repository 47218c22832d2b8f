//! Input filtering helpers
//!
//! Decides which files are candidate photos and which GPS records are fit to
//! be written to a track document.

use crate::types::GpsRecord;
use std::path::Path;

/// Photo and raw extensions accepted by directory scans (lowercase, no dot)
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "tif", "tiff", "bmp", "heic", "heif", "webp", "cr2", "nef", "arw", "dng",
    "orf", "rw2", "pef", "srw",
];

/// Case-insensitive check of a path's extension against [`SUPPORTED_EXTENSIONS`]
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

/// Validate a latitude/longitude pair
///
/// # Returns
/// `Err` with a human-readable reason when either value is non-finite or out of range
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), String> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err("Coordinates must be finite numeric values".to_string());
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!(
            "Invalid latitude value: {latitude}. Must be between -90 and 90."
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!(
            "Invalid longitude value: {longitude}. Must be between -180 and 180."
        ));
    }
    Ok(())
}

/// Validate an optional elevation; any finite value is accepted
pub fn validate_elevation(elevation: Option<f64>) -> Result<(), String> {
    match elevation {
        Some(value) if !value.is_finite() => Err(format!(
            "Invalid altitude value: {value}. Must be a finite number."
        )),
        _ => Ok(()),
    }
}

/// Whether a record may be written to a track document
pub fn is_usable_record(record: &GpsRecord) -> bool {
    validate_coordinates(record.latitude, record.longitude).is_ok()
        && validate_elevation(Some(record.altitude)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extension_case_insensitive() {
        assert!(has_supported_extension(Path::new("a/IMG_0001.JPG")));
        assert!(has_supported_extension(Path::new("b.Jpeg")));
        assert!(has_supported_extension(Path::new("raw/shot.NEF")));
        assert!(!has_supported_extension(Path::new("notes.txt")));
        assert!(!has_supported_extension(Path::new("no_extension")));
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(52.52, 13.405).is_ok());
        assert!(validate_coordinates(-90.0, 180.0).is_ok());
        assert!(validate_coordinates(90.0, -180.0).is_ok());

        let err = validate_coordinates(91.0, 0.0).unwrap_err();
        assert!(err.contains("latitude"));
        let err = validate_coordinates(0.0, -180.5).unwrap_err();
        assert!(err.contains("longitude"));
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_elevation() {
        assert!(validate_elevation(None).is_ok());
        assert!(validate_elevation(Some(-420.0)).is_ok());
        assert!(validate_elevation(Some(8848.86)).is_ok());

        let err = validate_elevation(Some(f64::NAN)).unwrap_err();
        assert!(err.contains("altitude"));
        assert!(validate_elevation(Some(f64::INFINITY)).is_err());
        assert!(validate_elevation(Some(f64::NEG_INFINITY)).is_err());
    }

    #[test]
    fn test_is_usable_record() {
        assert!(is_usable_record(&GpsRecord::new(10.0, 20.0)));
        assert!(!is_usable_record(&GpsRecord::new(f64::NAN, 20.0)));
        assert!(!is_usable_record(
            &GpsRecord::new(10.0, 20.0).with_altitude(f64::INFINITY)
        ));
    }
}
