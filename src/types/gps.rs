use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// GPS data decoded from one image.
///
/// A record only exists when both latitude and longitude were decoded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpsRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters, negative below sea level; 0.0 when the image has no altitude tag
    pub altitude: f64,
    /// Capture time; `None` when the image carries no usable time
    pub timestamp: Option<DateTime<Utc>>,
    /// Base name of the originating file
    pub source_name: String,
}

impl GpsRecord {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
            timestamp: None,
            source_name: String::new(),
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }
}

/// What to record when an image has no parseable capture time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MissingTime {
    /// Leave the timestamp empty; such records sort after all timed ones
    #[default]
    Unknown,
    /// Substitute the wall-clock time at extraction
    Now,
}

/// Options controlling metadata extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub missing_time: MissingTime,
}
