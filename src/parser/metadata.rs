//! GPS metadata extraction
//!
//! Decodes GPS coordinates, altitude and capture time from image metadata.
//! Two backends are tried in a fixed order: the container-aware EXIF reader,
//! then the raw embedded-EXIF scanner. A backend that fails or finds no
//! latitude/longitude pair hands over to the next one; every attempt is kept
//! in the returned [`Extraction`] so callers can see which backend produced
//! (or failed to produce) a record.

use crate::conversion::{
    convert_altitude, dms_to_decimal, parse_exif_datetime, signed_coordinate, DmsComponent,
    Hemisphere,
};
use crate::error::{MetadataError, PixTrailError};
use crate::parser::scan::read_embedded_exif;
use crate::types::{ExtractOptions, GpsRecord, MissingTime};
use crate::Result;
use chrono::{DateTime, Utc};
use exif::{Exif, In, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Metadata decoding backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Container-aware reader (JPEG, TIFF-based raw, PNG, HEIF, WebP)
    Container,
    /// Byte scan for an embedded `Exif` + TIFF block
    SegmentScan,
}

impl Backend {
    /// Order in which backends are consulted
    pub const ORDER: [Backend; 2] = [Backend::Container, Backend::SegmentScan];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Container => "container",
            Backend::SegmentScan => "segment-scan",
        }
    }

    fn read_exif(self, path: &Path) -> std::result::Result<Exif, MetadataError> {
        match self {
            Backend::Container => {
                let file = File::open(path)?;
                let mut reader = BufReader::new(file);
                Ok(exif::Reader::new().read_from_container(&mut reader)?)
            }
            Backend::SegmentScan => read_embedded_exif(path),
        }
    }

    fn decode(
        self,
        path: &Path,
        source_name: &str,
        options: &ExtractOptions,
    ) -> std::result::Result<Option<GpsRecord>, MetadataError> {
        let exif = self.read_exif(path)?;
        GpsTags::from_exif(&exif)?.into_record(source_name, options)
    }
}

/// Result of one backend attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Both coordinates decoded
    Decoded,
    /// Metadata was readable but carried no latitude/longitude pair
    NoGps,
    /// The backend faulted
    Failed(MetadataError),
}

#[derive(Debug)]
pub struct BackendAttempt {
    pub backend: Backend,
    pub outcome: AttemptOutcome,
}

/// Outcome of extracting one file
#[derive(Debug)]
pub struct Extraction {
    pub record: Option<GpsRecord>,
    pub attempts: Vec<BackendAttempt>,
}

impl Extraction {
    /// Backend that produced the record, if any
    pub fn decoded_by(&self) -> Option<Backend> {
        self.attempts
            .iter()
            .find(|a| matches!(a.outcome, AttemptOutcome::Decoded))
            .map(|a| a.backend)
    }

    /// True when at least one backend faulted and none decoded a record
    pub fn all_failed(&self) -> bool {
        self.record.is_none()
            && self
                .attempts
                .iter()
                .all(|a| matches!(a.outcome, AttemptOutcome::Failed(_)))
    }

    fn failure_summary(&self) -> String {
        self.attempts
            .iter()
            .filter_map(|a| match &a.outcome {
                AttemptOutcome::Failed(e) => Some(format!("{}: {e}", a.backend.name())),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// GPS-related tags read from one EXIF block. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpsTags {
    pub latitude: Option<[DmsComponent; 3]>,
    pub latitude_ref: Option<Hemisphere>,
    pub longitude: Option<[DmsComponent; 3]>,
    pub longitude_ref: Option<Hemisphere>,
    pub altitude: Option<DmsComponent>,
    pub altitude_ref: Option<u32>,
    pub capture_time: Option<DateTime<Utc>>,
}

/// Capture-time tags, most specific first
const CAPTURE_TIME_TAGS: [Tag; 2] = [Tag::DateTimeOriginal, Tag::DateTime];

impl GpsTags {
    pub fn from_exif(exif: &Exif) -> std::result::Result<Self, MetadataError> {
        Ok(Self {
            latitude: read_dms(exif, Tag::GPSLatitude, "GPSLatitude")?,
            latitude_ref: read_hemisphere(exif, Tag::GPSLatitudeRef),
            longitude: read_dms(exif, Tag::GPSLongitude, "GPSLongitude")?,
            longitude_ref: read_hemisphere(exif, Tag::GPSLongitudeRef),
            altitude: read_altitude(exif)?,
            altitude_ref: exif
                .get_field(Tag::GPSAltitudeRef, In::PRIMARY)
                .and_then(|f| f.value.get_uint(0)),
            capture_time: CAPTURE_TIME_TAGS
                .iter()
                .filter_map(|&tag| read_ascii(exif, tag))
                .find_map(|text| parse_exif_datetime(&text)),
        })
    }

    /// Build a record when both coordinates are present
    pub fn into_record(
        self,
        source_name: &str,
        options: &ExtractOptions,
    ) -> std::result::Result<Option<GpsRecord>, MetadataError> {
        let (Some(lat), Some(lon)) = (self.latitude, self.longitude) else {
            return Ok(None);
        };

        let latitude = dms_to_decimal(lat[0], lat[1], lat[2]).map_err(|source| {
            MetadataError::Conversion {
                tag: "GPSLatitude",
                source,
            }
        })?;
        let longitude = dms_to_decimal(lon[0], lon[1], lon[2]).map_err(|source| {
            MetadataError::Conversion {
                tag: "GPSLongitude",
                source,
            }
        })?;
        let altitude = match self.altitude {
            Some(altitude) => convert_altitude(altitude, self.altitude_ref).map_err(|source| {
                MetadataError::Conversion {
                    tag: "GPSAltitude",
                    source,
                }
            })?,
            None => 0.0,
        };
        let timestamp = match (self.capture_time, options.missing_time) {
            (Some(time), _) => Some(time),
            (None, MissingTime::Now) => Some(Utc::now()),
            (None, MissingTime::Unknown) => None,
        };

        Ok(Some(GpsRecord {
            latitude: signed_coordinate(latitude, self.latitude_ref),
            longitude: signed_coordinate(longitude, self.longitude_ref),
            altitude,
            timestamp,
            source_name: source_name.to_string(),
        }))
    }
}

fn component(value: &Value, index: usize) -> Option<DmsComponent> {
    match value {
        Value::Rational(v) => v.get(index).map(|&r| r.into()),
        Value::SRational(v) => v.get(index).map(|&r| r.into()),
        Value::Double(v) => v.get(index).map(|&x| DmsComponent::Number(x)),
        Value::Float(v) => v.get(index).map(|&x| DmsComponent::Number(x as f64)),
        Value::Byte(_) | Value::Short(_) | Value::Long(_) => value
            .get_uint(index)
            .map(|x| DmsComponent::Number(x as f64)),
        _ => None,
    }
}

fn read_dms(
    exif: &Exif,
    tag: Tag,
    tag_name: &'static str,
) -> std::result::Result<Option<[DmsComponent; 3]>, MetadataError> {
    let Some(field) = exif.get_field(tag, In::PRIMARY) else {
        return Ok(None);
    };
    match (
        component(&field.value, 0),
        component(&field.value, 1),
        component(&field.value, 2),
    ) {
        (Some(d), Some(m), Some(s)) => Ok(Some([d, m, s])),
        _ => Err(MetadataError::UnexpectedValue(tag_name)),
    }
}

fn read_altitude(exif: &Exif) -> std::result::Result<Option<DmsComponent>, MetadataError> {
    match exif.get_field(Tag::GPSAltitude, In::PRIMARY) {
        None => Ok(None),
        Some(field) => component(&field.value, 0)
            .map(Some)
            .ok_or(MetadataError::UnexpectedValue("GPSAltitude")),
    }
}

fn read_ascii(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(strings) => strings
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn read_hemisphere(exif: &Exif, tag: Tag) -> Option<Hemisphere> {
    read_ascii(exif, tag).and_then(|text| Hemisphere::from_ref(&text))
}

/// Extract GPS data from an image, recording every backend attempt
///
/// # Errors
/// `NotFound` when `path` is not an existing file. Decoding problems are not
/// errors: they appear as failed attempts and a `None` record.
pub fn extract_with_trace(path: &Path, options: &ExtractOptions) -> Result<Extraction> {
    if !path.is_file() {
        return Err(PixTrailError::NotFound(path.to_path_buf()));
    }

    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut extraction = Extraction {
        record: None,
        attempts: Vec::with_capacity(Backend::ORDER.len()),
    };

    for backend in Backend::ORDER {
        let outcome = match backend.decode(path, &source_name, options) {
            Ok(Some(record)) => {
                debug!(path = %path.display(), backend = backend.name(), "decoded GPS data");
                extraction.record = Some(record);
                AttemptOutcome::Decoded
            }
            Ok(None) => {
                debug!(path = %path.display(), backend = backend.name(), "no GPS tags");
                AttemptOutcome::NoGps
            }
            Err(e) => {
                debug!(path = %path.display(), backend = backend.name(), error = %e, "backend failed");
                AttemptOutcome::Failed(e)
            }
        };
        extraction.attempts.push(BackendAttempt { backend, outcome });
        if extraction.record.is_some() {
            return Ok(extraction);
        }
    }

    if extraction.all_failed() {
        warn!(
            "Error extracting EXIF data from {}: {}",
            path.display(),
            extraction.failure_summary()
        );
    }

    Ok(extraction)
}

/// Extract GPS data from an image with default options
///
/// Returns `Ok(None)` when the image carries no location.
pub fn extract_gps_data(path: &Path) -> Result<Option<GpsRecord>> {
    extract_with_options(path, &ExtractOptions::default())
}

pub fn extract_with_options(path: &Path, options: &ExtractOptions) -> Result<Option<GpsRecord>> {
    extract_with_trace(path, options).map(|extraction| extraction.record)
}
