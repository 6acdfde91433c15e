//! JSON file snapshot store with expiry metadata

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Key under which the last successful place collection is stored
pub const PLACES_SNAPSHOT_KEY: &str = "places";

/// On-disk envelope around a snapshot
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    data: T,
    saved_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// A snapshot read back from disk
#[derive(Debug)]
pub struct CachedData<T> {
    pub data: T,
    /// When the snapshot was written
    pub saved_at: DateTime<Utc>,
    /// Whether the snapshot is past its time-to-live
    pub is_expired: bool,
}

/// Reads and writes JSON snapshots in a cache directory
///
/// Defaults to the XDG cache directory (`~/.cache/placeboard/` on Linux).
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Uses the platform cache directory; `None` when no home directory exists
    pub fn new() -> Option<Self> {
        let dirs = ProjectDirs::from("", "", "placeboard")?;
        Some(Self {
            cache_dir: dirs.cache_dir().to_path_buf(),
        })
    }

    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Writes `data` under `key`, fresh for `ttl_hours`
    pub fn write<T: Serialize>(&self, key: &str, data: &T, ttl_hours: u64) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let saved_at = Utc::now();
        let envelope = Envelope {
            data,
            saved_at,
            expires_at: saved_at + Duration::hours(ttl_hours as i64),
        };
        let json = serde_json::to_string_pretty(&envelope)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(self.path_for(key), json)
    }

    /// Reads the snapshot under `key`
    ///
    /// Missing or unparseable files read as `None`; expired ones are returned
    /// with `is_expired = true`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let content = fs::read_to_string(self.path_for(key)).ok()?;
        let envelope: Envelope<T> = serde_json::from_str(&content).ok()?;

        Some(CachedData {
            data: envelope.data,
            saved_at: envelope.saved_at,
            is_expired: Utc::now() > envelope.expires_at,
        })
    }
}
