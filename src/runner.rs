//! `pg_dump` argument construction helpers.
//!
//! This module is responsible for *building* the argument list passed to
//! `pg_dump`.  It deliberately does **not** execute anything — process
//! execution lives in [`crate::ui`] so that the spinner can own the terminal
//! while the dump runs, and so the password can be injected through the
//! child's environment rather than the command line.
//!
//! Keeping arg-building separate from execution means every function here is
//! pure and trivially unit-testable without spawning any child processes.

use crate::config::DatabaseConfig;

/// Filename for a database dump stamped with `timestamp`.
///
/// The `.sql` suffix is kept for continuity even though `-F c` produces
/// PostgreSQL's custom binary format, not plain SQL.
pub fn dump_filename(timestamp: &str) -> String {
    format!("db_dump_{timestamp}.sql")
}

/// Builds the full `pg_dump` invocation:
///
/// ```text
/// pg_dump -h <host> -p <port> -U <user> -F c -f <dump_file> <db>
/// ```
///
/// `-F c` selects the custom format so the dump is compressed and
/// restorable with `pg_restore`.  The password is **not** part of the
/// arguments; callers pass it via `PGPASSWORD` in the child environment.
pub fn pg_dump_args(db: &DatabaseConfig, dump_file: &str) -> Vec<String> {
    vec![
        "pg_dump".into(),
        "-h".into(),
        db.host.clone(),
        "-p".into(),
        db.port.to_string(),
        "-U".into(),
        db.user.clone(),
        "-F".into(),
        "c".into(),
        "-f".into(),
        dump_file.into(),
        db.name.clone(),
    ]
}

// ─── Tests ────────────────────────────────────────────────────────────────────
