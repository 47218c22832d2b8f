use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the public PixTrail operations
#[derive(Debug, Error)]
pub enum PixTrailError {
    /// Input file or directory does not exist
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),
    /// A track document was requested from zero usable GPS records
    #[error("No GPS data available to create a GPX file")]
    EmptyInput,
    /// An existing track document could not be parsed; it was left untouched
    #[error("Existing GPX file {} is unreadable: {source}", path.display())]
    CorruptDocument {
        path: PathBuf,
        #[source]
        source: GpxError,
    },
    /// Write or create failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Latitude/longitude outside the valid domain
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
    /// Session identifiers become directory names and must be plain
    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),
}

impl PixTrailError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PixTrailError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Coordinate conversion failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Division by zero in rational value")]
    DivisionByZero,
}

/// Failure of a single metadata backend attempt.
///
/// These never escape `extract_*`: they trigger the fallback backend and are
/// recorded in the extraction trace.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("EXIF decode error: {0}")]
    Exif(#[from] exif::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed GPS tag {tag}: {source}")]
    Conversion {
        tag: &'static str,
        #[source]
        source: ConversionError,
    },
    #[error("Malformed GPS tag {0}: unexpected value type")]
    UnexpectedValue(&'static str),
    #[error("No embedded EXIF segment found")]
    NoExifSegment,
}

/// GPX document parse errors
#[derive(Debug, Error)]
pub enum GpxError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("Invalid value '{value}' for '{field}' on <{element}>")]
    InvalidValue {
        element: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("Unknown entity reference '&{0};'")]
    UnknownEntity(String),
    #[error("No <gpx> root element")]
    MissingRoot,
    #[error("Document ended inside <{0}>")]
    UnexpectedEof(&'static str),
}

pub type Result<T> = std::result::Result<T, PixTrailError>;
