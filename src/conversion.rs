//! Coordinate and timestamp conversion utilities
//!
//! Converts EXIF degrees/minutes/seconds triples to signed decimal degrees and
//! maps between the EXIF and GPX timestamp formats.

use crate::error::ConversionError;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// EXIF capture-time layout (`YYYY:MM:DD HH:MM:SS`)
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// One component of a DMS triple as stored in metadata.
///
/// EXIF stores rationals; some decoders hand back plain numbers. Both
/// normalize through [`DmsComponent::to_f64`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DmsComponent {
    Rational { num: i64, denom: i64 },
    Number(f64),
}

impl DmsComponent {
    pub fn to_f64(self) -> Result<f64, ConversionError> {
        match self {
            DmsComponent::Rational { denom: 0, .. } => Err(ConversionError::DivisionByZero),
            DmsComponent::Rational { num, denom } => Ok(num as f64 / denom as f64),
            DmsComponent::Number(value) => Ok(value),
        }
    }
}

impl From<exif::Rational> for DmsComponent {
    fn from(r: exif::Rational) -> Self {
        DmsComponent::Rational {
            num: r.num as i64,
            denom: r.denom as i64,
        }
    }
}

impl From<exif::SRational> for DmsComponent {
    fn from(r: exif::SRational) -> Self {
        DmsComponent::Rational {
            num: r.num as i64,
            denom: r.denom as i64,
        }
    }
}

impl From<f64> for DmsComponent {
    fn from(value: f64) -> Self {
        DmsComponent::Number(value)
    }
}

/// Convert a DMS triple to unsigned decimal degrees
pub fn dms_to_decimal(
    degrees: DmsComponent,
    minutes: DmsComponent,
    seconds: DmsComponent,
) -> Result<f64, ConversionError> {
    Ok(degrees.to_f64()? + minutes.to_f64()? / 60.0 + seconds.to_f64()? / 3600.0)
}

/// Hemisphere reference attached to a latitude or longitude tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Parse a reference tag value. Only the first character matters.
    pub fn from_ref(value: &str) -> Option<Self> {
        match value.trim().chars().next()?.to_ascii_uppercase() {
            'N' => Some(Hemisphere::North),
            'S' => Some(Hemisphere::South),
            'E' => Some(Hemisphere::East),
            'W' => Some(Hemisphere::West),
            _ => None,
        }
    }

    /// Sign a magnitude: `S` and `W` negate, `N` and `E` leave it as is
    pub fn apply(self, magnitude: f64) -> f64 {
        match self {
            Hemisphere::South | Hemisphere::West => -magnitude,
            Hemisphere::North | Hemisphere::East => magnitude,
        }
    }
}

/// Apply an optional hemisphere reference; absence leaves the magnitude positive
pub fn signed_coordinate(magnitude: f64, reference: Option<Hemisphere>) -> f64 {
    reference.map_or(magnitude, |r| r.apply(magnitude))
}

/// GPSAltitudeRef value meaning "below sea level"
pub const ALTITUDE_BELOW_SEA_LEVEL: u32 = 1;

/// Convert an altitude rational plus its reference byte to signed meters
pub fn convert_altitude(
    altitude: DmsComponent,
    reference: Option<u32>,
) -> Result<f64, ConversionError> {
    let meters = altitude.to_f64()?;
    Ok(if reference == Some(ALTITUDE_BELOW_SEA_LEVEL) {
        -meters
    } else {
        meters
    })
}

/// Parse an EXIF capture time. EXIF carries no zone, so the value is taken as UTC.
pub fn parse_exif_datetime(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim().trim_end_matches('\0'), EXIF_DATETIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a GPX `<time>` value with second precision
pub fn format_gpx_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a GPX `<time>` value (RFC 3339, or a zone-less ISO 8601 stamp read as UTC)
pub fn parse_gpx_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
