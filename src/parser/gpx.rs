//! GPX document reader
//!
//! Reads waypoints and tracks back into a [`TrackDocument`]. The reader is
//! strict: a malformed point, number, timestamp or entity fails the whole
//! document instead of being skipped, so that rewriting a loaded document
//! never drops data silently. Elements the model does not interpret
//! (`metadata`, `rte`, `extensions`, point children like `desc` or `link`)
//! are kept as verbatim XML and written back unchanged.

use crate::conversion::parse_gpx_timestamp;
use crate::error::GpxError;
use crate::types::{Track, TrackDocument, TrackPoint, TrackSegment, DEFAULT_CREATOR};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

type Result<T> = std::result::Result<T, GpxError>;

/// Root attributes the writer always emits itself
pub const WRITTEN_ROOT_ATTRIBUTES: [&str; 5] = [
    "version",
    "creator",
    "xmlns",
    "xmlns:xsi",
    "xsi:schemaLocation",
];

/// Parse a GPX XML string
pub fn parse_gpx(xml: &str) -> Result<TrackDocument> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"gpx" => {
                let mut doc = read_root(&e)?;
                parse_body(&mut reader, &mut doc)?;
                return Ok(doc);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"gpx" => {
                return read_root(&e);
            }
            Event::Start(_) | Event::Empty(_) | Event::Eof => return Err(GpxError::MissingRoot),
            _ => {}
        }
    }
}

/// Parse a GPX document from raw bytes
pub fn parse_gpx_bytes(bytes: &[u8]) -> Result<TrackDocument> {
    parse_gpx(std::str::from_utf8(bytes)?)
}

fn read_root(start: &BytesStart<'_>) -> Result<TrackDocument> {
    let mut doc = TrackDocument::new(DEFAULT_CREATOR);

    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| GpxError::Xml(e.into()))?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let raw = std::str::from_utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(raw)?.into_owned();
        if key == "creator" {
            doc.creator = value;
        } else if !WRITTEN_ROOT_ATTRIBUTES.contains(&key) {
            doc.root_attributes.push((key.to_string(), value));
        }
    }

    Ok(doc)
}

fn parse_body<'a>(reader: &mut Reader<&'a [u8]>, doc: &mut TrackDocument) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"wpt" => doc.waypoints.push(parse_point(&e, reader, "wpt")?),
                b"trk" => doc.tracks.push(parse_track(reader)?),
                b"metadata" => doc.metadata = Some(read_raw(reader, &e)?),
                b"rte" => doc.routes.push(read_raw(reader, &e)?),
                _ => doc.extensions.push(read_raw(reader, &e)?),
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"wpt" => doc.waypoints.push(parse_lat_lon(&e, "wpt")?),
                b"trk" => doc.tracks.push(Track::default()),
                b"metadata" => doc.metadata = Some(raw_empty(&e)?),
                b"rte" => doc.routes.push(raw_empty(&e)?),
                _ => doc.extensions.push(raw_empty(&e)?),
            },
            Event::End(e) if e.local_name().as_ref() == b"gpx" => return Ok(()),
            Event::Eof => return Err(GpxError::UnexpectedEof("gpx")),
            _ => {}
        }
    }
}

fn parse_number(text: &str, element: &'static str, field: &'static str) -> Result<f64> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| GpxError::InvalidValue {
            element,
            field,
            value: trimmed.to_string(),
        })
}

/// Point with lat/lon from a start tag and no children
fn parse_lat_lon(e: &BytesStart<'_>, element: &'static str) -> Result<TrackPoint> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| GpxError::Xml(e.into()))?;
        let val = std::str::from_utf8(&attr.value)?;
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(parse_number(val, element, "lat")?),
            b"lon" => lon = Some(parse_number(val, element, "lon")?),
            _ => {}
        }
    }

    let lat = lat.ok_or(GpxError::MissingAttribute {
        element,
        attribute: "lat",
    })?;
    let lon = lon.ok_or(GpxError::MissingAttribute {
        element,
        attribute: "lon",
    })?;

    Ok(TrackPoint::new(lat, lon))
}

/// Parse a `<wpt>` or `<trkpt>` and its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
    element: &'static str,
) -> Result<TrackPoint> {
    let mut point = parse_lat_lon(start, element)?;
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = read_text_owned(reader, &e)?;
                    point.elevation = Some(parse_number(&text, element, "ele")?);
                }
                b"time" => {
                    let text = read_text_owned(reader, &e)?;
                    point.time =
                        Some(parse_gpx_timestamp(&text).ok_or_else(|| GpxError::InvalidValue {
                            element,
                            field: "time",
                            value: text.trim().to_string(),
                        })?);
                }
                b"name" => point.name = Some(read_text_owned(reader, &e)?),
                _ => point.extra.push(read_raw(reader, &e)?),
            },
            Event::Empty(e) => point.extra.push(raw_empty(&e)?),
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            Event::Eof => return Err(GpxError::UnexpectedEof(element)),
            _ => {}
        }
    }

    Ok(point)
}

fn parse_track<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Track> {
    let mut track = Track::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"name" => track.name = Some(read_text_owned(reader, &e)?),
                b"trkseg" => track.segments.push(parse_segment(reader)?),
                _ => track.extra.push(read_raw(reader, &e)?),
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"trkseg" => track.segments.push(TrackSegment::default()),
                _ => track.extra.push(raw_empty(&e)?),
            },
            Event::End(e) if e.local_name().as_ref() == b"trk" => break,
            Event::Eof => return Err(GpxError::UnexpectedEof("trk")),
            _ => {}
        }
    }

    Ok(track)
}

fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>) -> Result<TrackSegment> {
    let mut segment = TrackSegment::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"trkpt" => segment.points.push(parse_point(&e, reader, "trkpt")?),
                _ => segment.extra.push(read_raw(reader, &e)?),
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"trkpt" => segment.points.push(parse_lat_lon(&e, "trkpt")?),
                _ => segment.extra.push(raw_empty(&e)?),
            },
            Event::End(e) if e.local_name().as_ref() == b"trkseg" => break,
            Event::Eof => return Err(GpxError::UnexpectedEof("trkseg")),
            _ => {}
        }
    }

    Ok(segment)
}

/// Verbatim XML of an element whose start tag was just read, children included
fn read_raw<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let tag = std::str::from_utf8(start)?;
    let binding = start.name();
    let name = std::str::from_utf8(binding.as_ref())?;
    let inner = reader.read_text(start.name())?;
    Ok(format!("<{tag}>{inner}</{name}>"))
}

fn raw_empty(start: &BytesStart<'_>) -> Result<String> {
    Ok(format!("<{}/>", std::str::from_utf8(start)?))
}

fn resolve_entity(name: &[u8]) -> Option<char> {
    match name {
        b"amp" => Some('&'),
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        _ => None,
    }
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, and entity references (Event::GeneralRef).
fn read_text_owned<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(std::str::from_utf8(e.as_ref())?),
            Event::CData(e) => text.push_str(std::str::from_utf8(e.as_ref())?),
            Event::GeneralRef(e) => {
                let ch = match e.resolve_char_ref() {
                    Ok(Some(ch)) => Some(ch),
                    Ok(None) => resolve_entity(e.as_ref()),
                    Err(_) => None,
                };
                match ch {
                    Some(ch) => text.push(ch),
                    None => {
                        return Err(GpxError::UnknownEntity(
                            String::from_utf8_lossy(e.as_ref()).into_owned(),
                        ))
                    }
                }
            }
            Event::End(e) if e.name().0 == end_name.as_slice() => break,
            Event::Eof => return Err(GpxError::UnexpectedEof("text")),
            _ => {}
        }
    }

    Ok(text)
}
