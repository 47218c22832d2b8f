//! Synthetic EXIF blobs for unit tests

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use std::io::Cursor;

pub struct Gps {
    pub lat: [(u32, u32); 3],
    pub lat_ref: &'static str,
    pub lon: [(u32, u32); 3],
    pub lon_ref: &'static str,
    pub altitude: Option<((u32, u32), u8)>,
}

impl Gps {
    /// 52°30'0" N, 13°24'0" E, 100 m above sea level
    pub fn berlin() -> Self {
        Self {
            lat: [(52, 1), (30, 1), (0, 1)],
            lat_ref: "N",
            lon: [(13, 1), (24, 1), (0, 1)],
            lon_ref: "E",
            altitude: Some(((100, 1), 0)),
        }
    }
}

fn field(tag: Tag, value: Value) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    }
}

fn rationals(parts: &[(u32, u32)]) -> Value {
    Value::Rational(
        parts
            .iter()
            .map(|&(num, denom)| Rational { num, denom })
            .collect(),
    )
}

fn ascii(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

pub fn gps_fields(gps: Gps, datetime: Option<&str>) -> Vec<Field> {
    let mut fields = vec![
        field(Tag::Make, ascii("PixTrail Test Camera")),
        field(Tag::GPSLatitudeRef, ascii(gps.lat_ref)),
        field(Tag::GPSLatitude, rationals(&gps.lat)),
        field(Tag::GPSLongitudeRef, ascii(gps.lon_ref)),
        field(Tag::GPSLongitude, rationals(&gps.lon)),
    ];
    if let Some((altitude, reference)) = gps.altitude {
        fields.push(field(Tag::GPSAltitudeRef, Value::Byte(vec![reference])));
        fields.push(field(Tag::GPSAltitude, rationals(&[altitude])));
    }
    if let Some(datetime) = datetime {
        fields.push(field(Tag::DateTime, ascii(datetime)));
    }
    fields
}

pub fn fields_without_gps() -> Vec<Field> {
    vec![field(Tag::Make, ascii("PixTrail Test Camera"))]
}

pub fn tiff(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for f in fields {
        writer.push_field(f);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).expect("write TIFF");
    buf.into_inner()
}

/// Minimal JPEG: SOI, APP1 Exif segment, EOI
pub fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let len = (2 + 6 + tiff.len()) as u16;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

pub fn read(tiff: Vec<u8>) -> exif::Exif {
    exif::Reader::new().read_raw(tiff).expect("read TIFF")
}
