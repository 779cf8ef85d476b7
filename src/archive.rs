//! Archiving — compress a downloaded bucket tree into a `.tar.gz` and
//! remove the uncompressed copy.
//!
//! The archive's root entry is the bucket name, so extraction always yields
//! a single `<bucket>/` directory regardless of where the tree was staged.
//! Cleanup of the source tree happens only after the archive has been fully
//! written and flushed; on any failure the tree is left untouched so nothing
//! already downloaded is lost.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use flate2::{Compression, write::GzEncoder};

use crate::{error::BackupError, timefmt};

/// Filename for an archive of `base` stamped with `timestamp`.
pub fn archive_filename(base: &str, timestamp: &str) -> String {
    format!("{base}_{timestamp}.tar.gz")
}

/// Compress `source_dir` into `out_dir/{base}_{timestamp}.tar.gz` with
/// `base` as the archive's root entry, then delete `source_dir`.
///
/// Returns the path of the written archive.  The source directory is only
/// removed after the gzip stream has been finished successfully.
pub fn compress_dir(source_dir: &Path, base: &str, out_dir: &Path) -> Result<PathBuf, BackupError> {
    let archive_path = out_dir.join(archive_filename(base, &timefmt::current_timestamp()));

    let file = File::create(&archive_path).map_err(|e| BackupError::filesystem(&archive_path, e))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    builder
        .append_dir_all(base, source_dir)
        .map_err(|e| BackupError::filesystem(source_dir, e))?;
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(|e| BackupError::filesystem(&archive_path, e))?;

    std::fs::remove_dir_all(source_dir).map_err(|e| BackupError::filesystem(source_dir, e))?;

    Ok(archive_path)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
