//! GPX export functionality
//!
//! Builds track documents from GPS records, extends existing documents one
//! point at a time, and serializes them to GPX 1.1.
//!
//! Every write goes to a temporary file next to the target which is then
//! renamed over it, so a failed write never leaves a truncated document in
//! place of a valid one. Read-modify-write cycles in [`append_to_gpx`] are not
//! locked: concurrent appends to one path can lose an update. Callers that
//! append concurrently must serialize access per path (see
//! [`crate::session::TrackSession`]).

use crate::conversion::format_gpx_timestamp;
use crate::error::PixTrailError;
use crate::filters::{is_usable_record, validate_coordinates, validate_elevation};
use crate::parser::gpx::parse_gpx_bytes;
use crate::types::*;
use crate::Result;
use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use std::cmp::Ordering;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Export options for controlling output documents
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Value of the root `creator` attribute
    pub creator: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            creator: DEFAULT_CREATOR.to_string(),
        }
    }
}

/// Results of a write: where the document went and what it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub gpx_path: PathBuf,
    pub waypoint_count: usize,
    pub track_point_count: usize,
}

impl ExportReport {
    fn for_document(path: &Path, doc: &TrackDocument) -> Self {
        Self {
            gpx_path: path.to_path_buf(),
            waypoint_count: doc.waypoints.len(),
            track_point_count: doc.track_point_count(),
        }
    }
}

/// Timed records first in ascending order, unknown times last
fn compare_capture_time(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Build a track document from GPS records
///
/// Records with invalid coordinates or a non-finite altitude are dropped.
/// Survivors are stably sorted by capture time and each one becomes a
/// waypoint and a point of the single track segment, in that order.
///
/// # Errors
/// `EmptyInput` when `records` holds no usable record.
pub fn build_track_document(
    records: &[GpsRecord],
    options: &ExportOptions,
) -> Result<TrackDocument> {
    let mut usable: Vec<&GpsRecord> = records.iter().filter(|r| is_usable_record(r)).collect();
    if usable.is_empty() {
        return Err(PixTrailError::EmptyInput);
    }
    if usable.len() < records.len() {
        debug!(
            "Dropped {} records with invalid coordinates or altitude",
            records.len() - usable.len()
        );
    }

    usable.sort_by(|a, b| compare_capture_time(&a.timestamp, &b.timestamp));

    let mut doc = TrackDocument::new(options.creator.clone());
    doc.waypoints = usable
        .iter()
        .map(|r| TrackPoint::waypoint_from_record(r))
        .collect();
    doc.running_segment_mut().points = usable
        .iter()
        .map(|r| TrackPoint::track_point_from_record(r))
        .collect();

    Ok(doc)
}

/// Build a track document from GPS records and write it to `output_path`
///
/// Missing parent directories are created. Nothing is written when the
/// build fails.
pub fn export_to_gpx(
    records: &[GpsRecord],
    output_path: &Path,
    options: &ExportOptions,
) -> Result<ExportReport> {
    let doc = build_track_document(records, options)?;
    write_document(&doc, output_path)?;
    info!("GPX file created successfully: {}", output_path.display());
    Ok(ExportReport::for_document(output_path, &doc))
}

/// Load the document at `path`, or an empty one when no file exists
///
/// # Errors
/// `CorruptDocument` when the file exists but is not a readable GPX document.
pub fn load_document(path: &Path) -> Result<TrackDocument> {
    if !path.is_file() {
        return Ok(TrackDocument::default());
    }
    let bytes = fs::read(path).map_err(|e| PixTrailError::io(path, e))?;
    parse_gpx_bytes(&bytes).map_err(|source| PixTrailError::CorruptDocument {
        path: path.to_path_buf(),
        source,
    })
}

/// Add one point to the GPX file at `path`, creating the file if needed
///
/// The point is appended to the waypoints and to the first segment of the
/// first track, which are created on the first append. The whole document is
/// rewritten, including the parts of it that are kept as verbatim XML.
///
/// # Errors
/// - `InvalidCoordinates` for out-of-range coordinates or a non-finite altitude
/// - `CorruptDocument` when an existing file cannot be parsed; the file is left untouched
/// - `Io` when the write fails
pub fn append_to_gpx(
    path: &Path,
    latitude: f64,
    longitude: f64,
    name: Option<&str>,
    altitude: Option<f64>,
    timestamp: Option<DateTime<Utc>>,
) -> Result<ExportReport> {
    validate_coordinates(latitude, longitude)
        .and_then(|_| validate_elevation(altitude))
        .map_err(PixTrailError::InvalidCoordinates)?;

    let mut doc = load_document(path)?;

    let waypoint = TrackPoint {
        latitude,
        longitude,
        elevation: altitude,
        time: timestamp,
        name: name.map(str::to_string),
        extra: Vec::new(),
    };
    let track_point = TrackPoint {
        name: None,
        ..waypoint.clone()
    };
    doc.waypoints.push(waypoint);
    doc.running_segment_mut().points.push(track_point);

    write_document(&doc, path)?;
    debug!(
        "Appended point ({latitude}, {longitude}) to {}",
        path.display()
    );
    Ok(ExportReport::for_document(path, &doc))
}

/// Create a directory tree if it does not exist
pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| PixTrailError::io(path, e))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Serialize `doc` and atomically replace `path` with it
pub fn write_document(doc: &TrackDocument, path: &Path) -> Result<()> {
    let dir = parent_dir(path);
    ensure_directory(dir)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PixTrailError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(&mut tmp);
        write_gpx(&mut writer, doc)
            .and_then(|_| writer.flush())
            .map_err(|e| PixTrailError::io(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| PixTrailError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| PixTrailError::io(path, e.error))?;
    Ok(())
}

fn write_point<W: Write>(w: &mut W, indent: &str, tag: &str, point: &TrackPoint) -> io::Result<()> {
    write!(
        w,
        r#"{indent}<{tag} lat="{}" lon="{}">"#,
        point.latitude, point.longitude
    )?;
    if let Some(ele) = point.elevation {
        write!(w, "<ele>{ele}</ele>")?;
    }
    if let Some(time) = &point.time {
        write!(w, "<time>{}</time>", format_gpx_timestamp(time))?;
    }
    if let Some(name) = &point.name {
        write!(w, "<name>{}</name>", escape(name.as_str()))?;
    }
    for raw in &point.extra {
        write!(w, "{raw}")?;
    }
    writeln!(w, "</{tag}>")
}

/// Write a document as GPX 1.1 XML
pub fn write_gpx<W: Write>(w: &mut W, doc: &TrackDocument) -> io::Result<()> {
    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    write!(
        w,
        r#"<gpx version="1.1" creator="{}" xmlns="http://www.topografix.com/GPX/1/1" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd""#,
        escape(doc.creator.as_str())
    )?;
    for (key, value) in &doc.root_attributes {
        write!(w, r#" {key}="{}""#, escape(value.as_str()))?;
    }
    writeln!(w, ">")?;

    if let Some(metadata) = &doc.metadata {
        writeln!(w, "  {metadata}")?;
    }

    for waypoint in &doc.waypoints {
        write_point(w, "  ", "wpt", waypoint)?;
    }

    for route in &doc.routes {
        writeln!(w, "  {route}")?;
    }

    for track in &doc.tracks {
        writeln!(w, "  <trk>")?;
        if let Some(name) = &track.name {
            writeln!(w, "    <name>{}</name>", escape(name.as_str()))?;
        }
        for raw in &track.extra {
            writeln!(w, "    {raw}")?;
        }
        for segment in &track.segments {
            writeln!(w, "    <trkseg>")?;
            for point in &segment.points {
                write_point(w, "      ", "trkpt", point)?;
            }
            for raw in &segment.extra {
                writeln!(w, "      {raw}")?;
            }
            writeln!(w, "    </trkseg>")?;
        }
        writeln!(w, "  </trk>")?;
    }

    for raw in &doc.extensions {
        writeln!(w, "  {raw}")?;
    }

    writeln!(w, "</gpx>")
}
