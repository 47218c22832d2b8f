//! PixTrail Library
//!
//! A Rust library for extracting GPS locations from geotagged photos and
//! writing them as GPX tracks.
//!
//! # Features
//!
//! - **`cli`** (default): Directory scanning and the command-line interface binary
//! - **`serde`**: Enable serialization/deserialization of types
//!
//! # Quick Start
//!
//! Read the location of a single photo:
//! ```rust,no_run
//! use pixtrail::extract_gps_data;
//! use std::path::Path;
//!
//! if let Some(record) = extract_gps_data(Path::new("IMG_0001.jpg")).unwrap() {
//!     println!("{}: {}, {}", record.source_name, record.latitude, record.longitude);
//! }
//! ```
//!
//! Build a GPX track from several photos:
//! ```rust,no_run
//! use pixtrail::{collect_gps_records, export_to_gpx, ExportOptions, ExtractOptions};
//! use std::path::Path;
//!
//! let photos = [Path::new("a.jpg"), Path::new("b.jpg")];
//! let collected = collect_gps_records(&photos, &ExtractOptions::default());
//! let report = export_to_gpx(
//!     &collected.records,
//!     Path::new("trip.gpx"),
//!     &ExportOptions::default(),
//! )
//! .unwrap();
//! println!("Wrote {} points to {}", report.track_point_count, report.gpx_path.display());
//! ```
//!
//! Grow a track one point at a time:
//! ```rust,no_run
//! use pixtrail::append_to_gpx;
//! use std::path::Path;
//!
//! append_to_gpx(Path::new("live.gpx"), 52.52, 13.405, Some("stop 1"), None, None).unwrap();
//! ```
//!
//! # Public API
//!
//! ## Extraction Functions
//! - [`extract_gps_data`] - GPS record of one image, or `None`
//! - [`extract_with_options`] - Same, with a missing-time policy
//! - [`extract_with_trace`] - Record plus every backend attempt
//! - [`collect_gps_records`] - Batch extraction that never aborts on a bad file
//!
//! ## Data Types
//! - [`GpsRecord`] - Location, altitude and capture time of one image
//! - [`TrackDocument`] - In-memory GPX document
//! - [`ExtractOptions`] / [`ExportOptions`] - Configuration
//! - [`ExportReport`] - Output path and point counts of a write
//!
//! ## Export Functions
//! - [`build_track_document`] - Time-ordered document from records
//! - [`export_to_gpx`] - Build and write a GPX file
//! - [`append_to_gpx`] - Add one point to a GPX file
//! - [`parse_gpx`] - Read a GPX document back
//! - [`TrackSession`] - Session directory with serialized appends
//!
//! ## Conversion Utilities
//! - [`dms_to_decimal`] - Degrees/minutes/seconds to decimal degrees
//! - [`convert_altitude`] - Altitude with sea-level reference
//! - [`format_gpx_timestamp`] - ISO-8601 timestamp with second precision

// Module declarations
pub mod conversion;
#[cfg(feature = "cli")]
pub mod discovery;
pub mod error;
pub mod export;
pub mod filters;
pub mod parser;
pub mod pipeline;
pub mod session;
pub mod types;

// Re-export everything from modules for convenience
#[allow(ambiguous_glob_reexports)]
pub use conversion::*;
#[cfg(feature = "cli")]
pub use discovery::*;
#[allow(ambiguous_glob_reexports)]
pub use error::*;
#[allow(ambiguous_glob_reexports)]
pub use export::*;
#[allow(ambiguous_glob_reexports)]
pub use filters::*;
#[allow(ambiguous_glob_reexports)]
pub use parser::*;
pub use pipeline::*;
pub use session::*;
#[allow(ambiguous_glob_reexports)]
pub use types::*;
