//! Input discovery for directory scans
//!
//! Turns an input directory into the list of candidate photos, and derives
//! the default GPX file name from the directory's name.

use crate::error::PixTrailError;
use crate::filters::has_supported_extension;
use crate::Result;
use glob::{glob, Pattern};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// File name used when the input directory name has no usable characters
pub const FALLBACK_OUTPUT_NAME: &str = "PixTrail.gpx";

/// Find candidate image files under `root`
///
/// Extension matching is case-insensitive. The result is sorted and holds
/// each path once.
///
/// # Errors
/// `NotFound` when `root` is not an existing directory.
pub fn find_image_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(PixTrailError::NotFound(root.to_path_buf()));
    }

    let escaped_root = Pattern::escape(&root.to_string_lossy());
    let pattern = if recursive {
        format!("{escaped_root}/**/*")
    } else {
        format!("{escaped_root}/*")
    };
    debug!("Scanning with pattern: {pattern}");

    let entries = glob(&pattern).map_err(|e| {
        PixTrailError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e.msg),
        )
    })?;

    let mut files = BTreeSet::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() && has_supported_extension(&path) => {
                files.insert(path);
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry: {e}"),
        }
    }

    debug!("Found {} image files in {}", files.len(), root.display());
    Ok(files.into_iter().collect())
}

/// Default output path for a directory scan
///
/// Uses `filename` when given, otherwise the directory's base name restricted
/// to letters, digits, space, `_` and `-`, with `.gpx` appended. The file is
/// placed inside `input_dir`.
pub fn default_output_path(input_dir: &Path, filename: Option<&str>) -> PathBuf {
    let name = match filename {
        Some(name) => name.to_string(),
        None => default_output_name(input_dir),
    };
    input_dir.join(name)
}

/// Last component of `path` after lexically folding `.` and `..`
///
/// Symlinks are not followed, so a linked directory keeps the link's name.
fn lexical_base_name(path: &Path) -> Option<String> {
    let mut names = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => names.push(name),
            Component::ParentDir => {
                names.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    names.last().map(|n| n.to_string_lossy().into_owned())
}

fn default_output_name(input_dir: &Path) -> String {
    let base = lexical_base_name(input_dir).unwrap_or_default();

    let safe: String = base
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    let safe = safe.trim();

    if safe.is_empty() {
        FALLBACK_OUTPUT_NAME.to_string()
    } else {
        format!("{safe}.gpx")
    }
}
