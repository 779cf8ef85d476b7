//! Subcommand handlers.
//!
//! Each file in this module corresponds to one user-facing command:
//!
//! | File          | Invocation                 | Description                      |
//! |---------------|----------------------------|----------------------------------|
//! | `init.rs`     | `doks-utils config`        | Scaffold a `doks_utils.env`      |
//! | `buckets.rs`  | `doks-utils dump-bucket`   | Concurrent bucket backup         |
//! | `dump_db.rs`  | `doks-utils dump-db`       | `pg_dump` subprocess stage       |
//!
//! `doks-utils dump-all` is a sequence of `buckets` then `dump_db`, wired up
//! in `main`.

pub mod buckets;
pub mod dump_db;
pub mod init;
