use crate::types::GpsRecord;
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Creator attribute written on documents this crate creates
pub const DEFAULT_CREATOR: &str = "PixTrail - GPS Photo Tracker";

/// A point in a track document: `<wpt>` or `<trkpt>`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    pub name: Option<String>,
    /// Children not modelled above (`desc`, `sym`, `link`, ...), verbatim XML
    pub extra: Vec<String>,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
            time: None,
            name: None,
            extra: Vec::new(),
        }
    }

    /// Waypoint for a record: carries the file name as its label
    pub fn waypoint_from_record(record: &GpsRecord) -> Self {
        Self {
            name: Some(record.source_name.clone()),
            ..Self::track_point_from_record(record)
        }
    }

    /// Unlabelled track point for a record
    pub fn track_point_from_record(record: &GpsRecord) -> Self {
        Self {
            latitude: record.latitude,
            longitude: record.longitude,
            elevation: Some(record.altitude),
            time: record.timestamp,
            name: None,
            extra: Vec::new(),
        }
    }
}

/// `<trkseg>`
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackSegment {
    pub points: Vec<TrackPoint>,
    pub extra: Vec<String>,
}

/// `<trk>`
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Track {
    pub name: Option<String>,
    pub segments: Vec<TrackSegment>,
    pub extra: Vec<String>,
}

/// In-memory GPX document.
///
/// Documents built here hold one track with one segment. Documents loaded
/// from disk keep whatever tracks they had, and keep the parts of the file
/// that are not modelled as verbatim XML so that rewriting loses nothing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackDocument {
    pub creator: String,
    /// Root attributes other than the ones always written (namespace
    /// declarations used by extensions, mostly), unescaped
    pub root_attributes: Vec<(String, String)>,
    /// `<metadata>` element, verbatim
    pub metadata: Option<String>,
    pub waypoints: Vec<TrackPoint>,
    /// `<rte>` elements, verbatim
    pub routes: Vec<String>,
    pub tracks: Vec<Track>,
    /// `<extensions>` and any unknown top-level element, verbatim
    pub extensions: Vec<String>,
}

impl Default for TrackDocument {
    fn default() -> Self {
        Self {
            creator: DEFAULT_CREATOR.to_string(),
            root_attributes: Vec::new(),
            metadata: None,
            waypoints: Vec::new(),
            routes: Vec::new(),
            tracks: Vec::new(),
            extensions: Vec::new(),
        }
    }
}

impl TrackDocument {
    pub fn new(creator: impl Into<String>) -> Self {
        Self {
            creator: creator.into(),
            ..Self::default()
        }
    }

    /// First segment of the first track, created if missing
    pub fn running_segment_mut(&mut self) -> &mut TrackSegment {
        if self.tracks.is_empty() {
            self.tracks.push(Track::default());
        }
        let track = &mut self.tracks[0];
        if track.segments.is_empty() {
            track.segments.push(TrackSegment::default());
        }
        &mut track.segments[0]
    }

    /// Points of the first segment of the first track
    pub fn track_points(&self) -> &[TrackPoint] {
        self.tracks
            .first()
            .and_then(|t| t.segments.first())
            .map(|s| s.points.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of track points across all tracks and segments
    pub fn track_point_count(&self) -> usize {
        self.tracks
            .iter()
            .flat_map(|t| t.segments.iter())
            .map(|s| s.points.len())
            .sum()
    }
}
