//! Per-session track files
//!
//! A [`TrackSession`] owns one directory holding one `track.gpx`. Writes made
//! through sessions are serialized per directory: every session opened on the
//! same directory in this process shares one lock, which closes the
//! lost-update race that plain [`append_to_gpx`] has when two writers target
//! the same file. Writers outside this process are not covered.

use crate::error::PixTrailError;
use crate::export::{append_to_gpx, ensure_directory, export_to_gpx, ExportOptions, ExportReport};
use crate::types::GpsRecord;
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, info};

/// Name of the track file inside a session directory
pub const TRACK_FILE_NAME: &str = "track.gpx";

type PathLock = Arc<Mutex<()>>;

/// Write locks of open sessions, keyed by canonical session directory
fn path_locks() -> &'static Mutex<HashMap<PathBuf, PathLock>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, PathLock>>> = OnceLock::new();
    LOCKS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn lock_for(key: &Path) -> PathLock {
    let mut locks = path_locks().lock().unwrap_or_else(|e| e.into_inner());
    Arc::clone(locks.entry(key.to_path_buf()).or_default())
}

/// A directory-scoped track with single-writer appends
#[derive(Debug)]
pub struct TrackSession {
    id: String,
    dir: PathBuf,
    created_at: DateTime<Utc>,
    ttl: Duration,
    lock_key: PathBuf,
    write_lock: PathLock,
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl TrackSession {
    /// Open (or create) the session directory `root/id`
    ///
    /// # Errors
    /// `InvalidSessionId` unless `id` is 1-64 ASCII letters, digits, `-` or `_`.
    pub fn open(root: &Path, id: &str, ttl: Duration) -> Result<Self> {
        if !is_valid_id(id) {
            return Err(PixTrailError::InvalidSessionId(id.to_string()));
        }
        let dir = root.join(id);
        ensure_directory(&dir)?;
        let lock_key = dir.canonicalize().map_err(|e| PixTrailError::io(&dir, e))?;
        let write_lock = lock_for(&lock_key);
        debug!("Opened session {id} at {}", dir.display());

        Ok(Self {
            id: id.to_string(),
            dir,
            created_at: Utc::now(),
            ttl,
            lock_key,
            write_lock,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn track_path(&self) -> PathBuf {
        self.dir.join(TRACK_FILE_NAME)
    }

    /// `None` when the TTL reaches past the representable range: never expires
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.checked_add_signed(self.ttl)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| now >= at)
    }

    /// Append one point to the session track
    pub fn append(
        &self,
        latitude: f64,
        longitude: f64,
        name: Option<&str>,
        altitude: Option<f64>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<ExportReport> {
        // A panic in another writer cannot leave a half-written file behind
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        append_to_gpx(
            &self.track_path(),
            latitude,
            longitude,
            name,
            altitude,
            timestamp,
        )
    }

    /// Replace the session track with one built from `records`
    pub fn write_records(
        &self,
        records: &[GpsRecord],
        options: &ExportOptions,
    ) -> Result<ExportReport> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        export_to_gpx(records, &self.track_path(), options)
    }

    /// Remove the session directory and everything in it
    pub fn close(self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(PixTrailError::io(&self.dir, e)),
        }
        info!("Closed session {}", self.id);
        Ok(())
    }
}

impl Drop for TrackSession {
    fn drop(&mut self) {
        let mut locks = path_locks().lock().unwrap_or_else(|e| e.into_inner());
        // The registry and this session hold the only references
        if Arc::strong_count(&self.write_lock) <= 2 {
            locks.remove(&self.lock_key);
        }
    }
}
