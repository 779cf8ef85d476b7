//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main` and then
//! passed (by reference) into the command handlers.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI arguments, shared across every subcommand.
#[derive(Parser, Debug)]
#[command(
    name    = "doks-utils",
    about   = "S3 bucket backups and Postgres dumps driven by an env file",
    version,
    // Show a compact two-column help layout.
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Path to the env file holding all settings.
    ///
    /// Defaults to `doks_utils.env` in the current working directory.  Use
    /// `--env-file /path/to/other.env` to point at a config stored elsewhere
    /// (useful when running from a cron job or a different working
    /// directory).
    #[arg(short, long, default_value = "doks_utils.env")]
    pub env_file: PathBuf,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Subcommand,
}

/// The four user-facing operations.
#[derive(clap::Subcommand, Debug, PartialEq)]
pub enum Subcommand {
    /// Download the named S3 buckets and compress each into a tar.gz.
    ///
    /// Each bucket is downloaded into `LOCAL_DOWNLOAD_DIR/<bucket>` by a
    /// pool of concurrent workers, compressed into
    /// `<bucket>_<timestamp>.tar.gz` in the current directory, and the
    /// uncompressed tree is removed afterwards.
    DumpBucket {
        /// Names of the buckets to back up, processed one at a time.
        buckets: Vec<String>,
    },

    /// Dump the Postgres database with pg_dump (custom format).
    ///
    /// Writes `db_dump_<timestamp>.sql` in the current directory using the
    /// connection settings from the env file.
    DumpDb,

    /// Write a template env file to fill out.
    ///
    /// Exits with an error if the file already exists to avoid accidental
    /// overwrites.
    Config,

    /// Run dump-bucket followed by dump-db.
    DumpAll {
        /// Names of the buckets to back up before the database dump.
        buckets: Vec<String>,
    },
}

// ─── Tests ────────────────────────────────────────────────────────────────────
