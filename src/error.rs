//! Error taxonomy shared by every stage of the tool.
//!
//! Each variant maps to one failure domain:
//!
//! | Variant          | Raised by                                         |
//! |------------------|---------------------------------------------------|
//! | `Configuration`  | env-file loading and validation                   |
//! | `InvalidArgument`| argument checks (e.g. zero bucket names)          |
//! | `Provider`       | S3 listing / object fetch                         |
//! | `Filesystem`     | local directory creation, writes, archive I/O     |
//! | `Subprocess`     | non-zero `pg_dump` exit                           |
//! | `Download`       | aggregated per-object failures for one bucket     |
//!
//! Configuration and argument errors abort before any work begins.  During
//! the download phase individual object failures are *collected*, never
//! retried, and surfaced as a single [`BackupError::Download`] once every
//! object has been attempted — already-downloaded files stay on disk.

use std::path::PathBuf;

use thiserror::Error;

/// One object that could not be downloaded, with a human-readable reason.
#[derive(Debug, Clone)]
pub struct DownloadFailure {
    /// The object key as returned by the bucket listing.
    pub key: String,
    /// Display form of the underlying provider or filesystem error.
    pub reason: String,
}

/// All failure modes of the backup pipeline.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Missing or invalid settings in the env file.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A caller-supplied argument was rejected before any work started.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The storage provider rejected or failed a request.
    #[error("storage provider error: {0}")]
    Provider(String),

    /// A local filesystem operation failed.
    #[error("filesystem error at '{}': {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external dump utility exited non-zero or could not be spawned.
    #[error("subprocess error: {0}")]
    Subprocess(String),

    /// One or more objects in a bucket failed to download.
    ///
    /// Every object was still attempted exactly once; the download
    /// directory is preserved so the salvaged files are not lost.
    #[error("{} object(s) in bucket '{bucket}' failed to download", failures.len())]
    Download {
        bucket: String,
        failures: Vec<DownloadFailure>,
    },
}

impl BackupError {
    /// Shorthand for a [`BackupError::Filesystem`] wrapping `source` at `path`.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
