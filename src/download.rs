//! Concurrent bucket download — single-object fetch plus the worker pool
//! that drains a listing.
//!
//! # Worker pool
//!
//! The listed objects are shared as an `Arc<Vec<_>>` and claimed through an
//! atomic index: each worker does `fetch_add(1)` and downloads the object at
//! the claimed slot, so no two workers ever process the same object and no
//! object is skipped.  Workers run as tokio tasks; the pool size comes from
//! the config (default: CPU count minus two, floored at one).
//!
//! # Failure policy
//!
//! Per-object failures are collected, not retried and not fatal to the rest
//! of the pool: every object is attempted exactly once, then all failures
//! are raised together as a single [`BackupError::Download`].  Files that
//! did download stay on disk so a follow-up run has less to do.

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use indicatif::ProgressBar;

use crate::{
    error::{BackupError, DownloadFailure},
    provider::{ObjectStore, RemoteObject},
};

/// Worker-pool size when `DOWNLOAD_CONCURRENCY` is not set: the number of
/// available CPUs minus two, floored at one.  Leaves headroom for the
/// archiver and whatever else the machine is doing.
pub fn default_concurrency() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cpus.saturating_sub(2).max(1)
}

/// A key ending in the path separator is a "folder" placeholder with no
/// content and must never be written as a file.
pub fn is_marker(key: &str) -> bool {
    key.ends_with('/')
}

/// Local path an object key maps to under `dest_root`.
pub fn target_path(dest_root: &Path, key: &str) -> PathBuf {
    dest_root.join(key)
}

/// Download one object to `dest_root/key`, creating parent directories as
/// needed.  Marker keys stop after directory creation.  Existing files are
/// overwritten.
pub async fn download_object<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    object: &RemoteObject,
    dest_root: &Path,
) -> Result<(), BackupError> {
    let target = target_path(dest_root, &object.key);

    // create_dir_all is idempotent, so concurrent workers racing on a
    // shared parent are fine.
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| BackupError::filesystem(parent, e))?;
    }

    if is_marker(&object.key) {
        return Ok(());
    }

    let bytes = store.fetch(bucket, &object.key).await?;
    tokio::fs::write(&target, bytes)
        .await
        .map_err(|e| BackupError::filesystem(&target, e))?;

    Ok(())
}

/// Drain `objects` through a pool of `concurrency` workers, ticking
/// `progress` once per attempted object (markers and failures included).
///
/// Returns only after every object has been attempted exactly once.  All
/// per-object failures are aggregated into one [`BackupError::Download`],
/// sorted by key so the report is deterministic.
pub async fn download_all<S: ObjectStore + 'static>(
    store: Arc<S>,
    bucket: &str,
    objects: Vec<RemoteObject>,
    dest_root: &Path,
    concurrency: usize,
    progress: &ProgressBar,
) -> Result<(), BackupError> {
    if objects.is_empty() {
        return Ok(());
    }

    let objects = Arc::new(objects);
    let next = Arc::new(AtomicUsize::new(0));
    let workers = concurrency.max(1).min(objects.len());

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let store = Arc::clone(&store);
        let objects = Arc::clone(&objects);
        let next = Arc::clone(&next);
        let bucket = bucket.to_string();
        let dest_root = dest_root.to_path_buf();
        let progress = progress.clone();

        handles.push(tokio::spawn(async move {
            let mut failures = Vec::new();
            loop {
                let claimed = next.fetch_add(1, Ordering::SeqCst);
                let Some(object) = objects.get(claimed) else {
                    break;
                };
                if let Err(e) =
                    download_object(store.as_ref(), &bucket, object, &dest_root).await
                {
                    failures.push(DownloadFailure {
                        key: object.key.clone(),
                        reason: e.to_string(),
                    });
                }
                progress.inc(1);
            }
            failures
        }));
    }

    // Every handle is awaited before any error is propagated, so no worker
    // outlives this call or ticks the progress bar after it returns.
    let mut failures = Vec::new();
    let mut panicked = None;
    for handle in handles {
        match handle.await {
            Ok(worker_failures) => failures.extend(worker_failures),
            Err(e) => panicked = Some(e),
        }
    }
    if let Some(e) = panicked {
        return Err(BackupError::Provider(format!(
            "download worker panicked: {e}"
        )));
    }

    if failures.is_empty() {
        Ok(())
    } else {
        failures.sort_by(|a, b| a.key.cmp(&b.key));
        Err(BackupError::Download {
            bucket: bucket.to_string(),
            failures,
        })
    }
}

// ─── Test double ──────────────────────────────────────────────────────────────


// ─── Tests ────────────────────────────────────────────────────────────────────
