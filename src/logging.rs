//! Log file setup
//!
//! The terminal belongs to the UI, so logs go to a file. `RUST_LOG` controls
//! the filter; without it only this crate's info-level events are kept.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "placeboard=info";

const LOG_FILE_NAME: &str = "placeboard.log";

/// Default log location under the user's local data directory
pub fn default_log_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "placeboard").map(|dirs| dirs.data_local_dir().join(LOG_FILE_NAME))
}

/// Installs the global subscriber writing to `path` (or the default path)
///
/// Returns the file actually used. A second call fails because the global
/// subscriber is already set.
pub fn init(path: Option<&Path>) -> io::Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_log_path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    Ok(path)
}
