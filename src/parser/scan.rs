//! Embedded EXIF scanner
//!
//! Secondary metadata backend. Instead of walking the container structure it
//! searches the raw bytes for an `Exif` marker followed by a TIFF header and
//! decodes the block found there. This recovers GPS tags from files whose
//! container the primary reader rejects (junk prefixes, truncated marker
//! chains, unrecognised wrappers).

use crate::error::MetadataError;
use exif::Exif;
use std::path::Path;

const EXIF_MARKER: &[u8] = b"Exif";
const TIFF_LITTLE_ENDIAN: &[u8] = b"II*\0";
const TIFF_BIG_ENDIAN: &[u8] = b"MM\0*";

/// Padding bytes tolerated between the marker and the TIFF header
const MAX_MARKER_PADDING: usize = 4;

/// Offsets of every TIFF header that directly follows an `Exif` marker
pub fn embedded_tiff_offsets(data: &[u8]) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut search_from = 0;

    while let Some(found) = find_subslice(&data[search_from..], EXIF_MARKER) {
        let marker_end = search_from + found + EXIF_MARKER.len();
        let mut start = marker_end;
        while start < data.len() && data[start] == 0 && start - marker_end < MAX_MARKER_PADDING {
            start += 1;
        }

        let rest = &data[start..];
        if rest.starts_with(TIFF_LITTLE_ENDIAN) || rest.starts_with(TIFF_BIG_ENDIAN) {
            offsets.push(start);
        }
        search_from = search_from + found + 1;
    }

    offsets
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Decode the first embedded EXIF block in `data` that parses cleanly
pub fn decode_embedded_exif(data: &[u8]) -> Result<Exif, MetadataError> {
    let mut last_error = None;

    for offset in embedded_tiff_offsets(data) {
        match exif::Reader::new().read_raw(data[offset..].to_vec()) {
            Ok(exif) => return Ok(exif),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.map_or(MetadataError::NoExifSegment, MetadataError::Exif))
}

/// Read a file and decode its first embedded EXIF block
pub fn read_embedded_exif(path: &Path) -> Result<Exif, MetadataError> {
    let data = std::fs::read(path)?;
    decode_embedded_exif(&data)
}
