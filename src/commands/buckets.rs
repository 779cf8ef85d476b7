//! `doks-utils dump-bucket` — the per-bucket backup pipeline.
//!
//! # Pipeline phases (per bucket, in order)
//!
//! | # | Phase    | Description                                          |
//! |---|----------|------------------------------------------------------|
//! | 1 | List     | Enumerate every object key in the bucket             |
//! | 2 | Download | Worker pool drains the listing into the staging dir  |
//! | 3 | Archive  | tar.gz the staging dir, then delete it               |
//!
//! Buckets are processed strictly one at a time — only the download phase
//! inside a bucket is concurrent.  A failure in any phase aborts that
//! bucket and is reported with the bucket name attached; the remaining
//! buckets still run, and the command exits non-zero at the end if any
//! bucket failed.  A failed download phase leaves the staging directory in
//! place (everything that did download is salvageable) and skips archiving.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Result, bail};

use crate::{
    archive,
    config::Config,
    download,
    error::BackupError,
    provider::{ObjectStore, S3Store},
    ui::{self, StageOutcome, print_summary},
};

/// Reject an empty bucket list before any configuration or network work.
pub fn ensure_non_empty(buckets: &[String]) -> Result<(), BackupError> {
    if buckets.is_empty() {
        return Err(BackupError::InvalidArgument(
            "you must specify at least one bucket name".into(),
        ));
    }
    Ok(())
}

/// Back up `buckets` using an S3 client built from the env-file settings.
///
/// Archives land in the current working directory.
pub async fn run(cfg: &Config, buckets: &[String]) -> Result<()> {
    ensure_non_empty(buckets)?;
    let storage = cfg.storage()?;
    let store = Arc::new(S3Store::connect(&storage).await?);
    run_with_store(store, cfg, buckets, Path::new(".")).await
}

/// Pipeline body, generic over the store so tests can drive it without a
/// network.
pub async fn run_with_store<S: ObjectStore + 'static>(
    store: Arc<S>,
    cfg: &Config,
    buckets: &[String],
    archive_dir: &Path,
) -> Result<()> {
    ensure_non_empty(buckets)?;
    println!();

    let mut outcomes: Vec<StageOutcome> = Vec::new();
    for bucket in buckets {
        let label = format!("Bucket '{bucket}'");
        let outcome = match backup_bucket(Arc::clone(&store), cfg, bucket, archive_dir).await {
            Ok(archive_path) => {
                println!(
                    "Bucket '{bucket}' downloaded and compressed into {}.",
                    archive_path.display()
                );
                StageOutcome::ok(&label)
            },
            Err(err) => StageOutcome::failed_with(&label, err.to_string(), failure_detail(&err)),
        };
        outcome.print();
        outcomes.push(outcome);
    }

    print_summary(&outcomes);

    let failed = outcomes.iter().filter(|o| o.failed()).count();
    if failed > 0 {
        bail!("{failed} of {} bucket(s) failed to back up", buckets.len());
    }
    Ok(())
}

/// List → download → archive for a single bucket.
async fn backup_bucket<S: ObjectStore + 'static>(
    store: Arc<S>,
    cfg: &Config,
    bucket: &str,
    archive_dir: &Path,
) -> Result<PathBuf, BackupError> {
    let spinner = ui::make_spinner(&format!("Listing bucket {bucket}"));
    let listing = store.list(bucket).await;
    spinner.finish_and_clear();
    let objects = listing?;

    let staging = cfg.download_dir.join(bucket);
    let progress = ui::download_progress(objects.len() as u64, bucket);
    let downloads = download::download_all(
        Arc::clone(&store),
        bucket,
        objects,
        &staging,
        cfg.concurrency,
        &progress,
    )
    .await;
    progress.finish_and_clear();
    downloads?;

    println!("Compressing downloaded files...");
    archive::compress_dir(&staging, bucket, archive_dir)
}

/// Per-object failure lines for replay under a failed bucket stage.
fn failure_detail(err: &BackupError) -> String {
    match err {
        BackupError::Download { failures, .. } => failures
            .iter()
            .map(|f| format!("{}: {}", f.key, f.reason))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
