//! `doks-utils` — S3 bucket backups and Postgres dumps driven by an env file.
//!
//! # Overview
//!
//! This binary replaces a pair of hand-run backup chores with one
//! config-driven tool: point `doks_utils.env` at your S3 credentials and
//! Postgres instance, then back up buckets into timestamped `.tar.gz`
//! archives and dump the database in a single invocation.
//!
//! # Usage
//!
//! ```text
//! doks-utils config                     # scaffold a doks_utils.env
//! doks-utils dump-bucket b1 b2          # back up buckets b1 and b2
//! doks-utils dump-db                    # pg_dump the configured database
//! doks-utils dump-all b1 b2             # both, in sequence
//! doks-utils --env-file other.env ...   # use a different env file
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                              |
//! |--------------------------|---------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap               |
//! | [`config`]               | `Config` struct + env-file loader           |
//! | [`error`]                | `BackupError` taxonomy                      |
//! | [`provider`]             | `ObjectStore` trait + S3 client             |
//! | [`download`]             | Single-object fetch + worker pool           |
//! | [`archive`]              | tar.gz compression + staging cleanup        |
//! | [`runner`]               | `pg_dump` argument construction             |
//! | [`timefmt`]              | Sortable filename timestamps                |
//! | [`ui`]                   | Spinner, progress bar, captured execution   |
//! | [`commands::init`]       | `config` subcommand                         |
//! | [`commands::buckets`]    | `dump-bucket` pipeline                      |
//! | [`commands::dump_db`]    | `dump-db` subcommand                        |

mod archive;
mod cli;
mod commands;
mod config;
mod download;
mod error;
mod provider;
mod runner;
mod timefmt;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Subcommand};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        // ── doks-utils config ─────────────────────────────────────────────────
        Subcommand::Config => {
            commands::init::run(&cli.env_file)?;
        },

        // ── doks-utils dump-bucket ────────────────────────────────────────────
        Subcommand::DumpBucket { buckets } => {
            // Argument check happens before config loading so a missing env
            // file never masks the real mistake.
            commands::buckets::ensure_non_empty(buckets)?;
            let cfg = config::load(&cli.env_file)?;
            commands::buckets::run(&cfg, buckets).await?;
        },

        // ── doks-utils dump-db ────────────────────────────────────────────────
        Subcommand::DumpDb => {
            let cfg = config::load(&cli.env_file)?;
            commands::dump_db::run(&cfg)?;
        },

        // ── doks-utils dump-all ───────────────────────────────────────────────
        Subcommand::DumpAll { buckets } => {
            commands::buckets::ensure_non_empty(buckets)?;
            let cfg = config::load(&cli.env_file)?;

            println!("Dumping specified S3 buckets...");
            commands::buckets::run(&cfg, buckets).await?;

            println!();
            println!("===================");
            println!("Dumping database...");
            commands::dump_db::run(&cfg)?;
        },
    }

    Ok(())
}
