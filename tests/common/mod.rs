//! Shared photo fixtures for integration tests
#![allow(dead_code)]

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// GPS tags to embed in a synthetic photo
pub struct PhotoGps {
    pub lat: [(u32, u32); 3],
    pub lat_ref: &'static str,
    pub lon: [(u32, u32); 3],
    pub lon_ref: &'static str,
    pub altitude: Option<((u32, u32), u8)>,
    pub datetime: Option<&'static str>,
}

impl PhotoGps {
    /// 52°30'0" N, 13°24'0" E, 100 m above sea level
    pub fn berlin() -> Self {
        Self {
            lat: [(52, 1), (30, 1), (0, 1)],
            lat_ref: "N",
            lon: [(13, 1), (24, 1), (0, 1)],
            lon_ref: "E",
            altitude: Some(((100, 1), 0)),
            datetime: Some("2023:01:01 12:00:00"),
        }
    }

    /// 33°52'7.75" S, 151°12'33.46" E, 5 m below sea level
    pub fn sydney() -> Self {
        Self {
            lat: [(33, 1), (52, 1), (775, 100)],
            lat_ref: "S",
            lon: [(151, 1), (12, 1), (3346, 100)],
            lon_ref: "E",
            altitude: Some(((5, 1), 1)),
            datetime: Some("2023:01:02 08:30:00"),
        }
    }

    pub fn with_datetime(mut self, datetime: Option<&'static str>) -> Self {
        self.datetime = datetime;
        self
    }
}

fn field(tag: Tag, value: Value) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    }
}

fn ascii(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

fn rationals(parts: &[(u32, u32)]) -> Value {
    Value::Rational(
        parts
            .iter()
            .map(|&(num, denom)| Rational { num, denom })
            .collect(),
    )
}

/// TIFF block carrying `gps`, or only a camera make when `gps` is `None`
pub fn tiff(gps: Option<PhotoGps>) -> Vec<u8> {
    let mut fields = vec![field(Tag::Make, ascii("Integration Camera"))];
    if let Some(gps) = gps {
        fields.push(field(Tag::GPSLatitudeRef, ascii(gps.lat_ref)));
        fields.push(field(Tag::GPSLatitude, rationals(&gps.lat)));
        fields.push(field(Tag::GPSLongitudeRef, ascii(gps.lon_ref)));
        fields.push(field(Tag::GPSLongitude, rationals(&gps.lon)));
        if let Some((altitude, reference)) = gps.altitude {
            fields.push(field(Tag::GPSAltitudeRef, Value::Byte(vec![reference])));
            fields.push(field(Tag::GPSAltitude, rationals(&[altitude])));
        }
        if let Some(datetime) = gps.datetime {
            fields.push(field(Tag::DateTimeOriginal, ascii(datetime)));
        }
    }

    let mut writer = Writer::new();
    for f in &fields {
        writer.push_field(f);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).expect("Failed to write TIFF");
    buf.into_inner()
}

/// Minimal JPEG: SOI, APP1 Exif segment, EOI
pub fn jpeg(tiff: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let len = (2 + 6 + tiff.len()) as u16;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// Write a JPEG with the given GPS tags to `dir/name`
pub fn write_photo(dir: &Path, name: &str, gps: Option<PhotoGps>) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create photo dir");
    }
    fs::write(&path, jpeg(&tiff(gps))).expect("Failed to write photo");
    path
}
