//! `doks-utils dump-db` — run `pg_dump` as a captured subprocess stage.

use anyhow::Result;

use crate::{config::Config, error::BackupError, runner, timefmt, ui};

/// Dump the configured database into `db_dump_<timestamp>.sql` in the
/// current directory.
///
/// The dump runs behind a spinner with output captured; the password
/// travels only through `PGPASSWORD` in the child's environment.  A
/// non-zero exit from `pg_dump` fails the whole command.
pub fn run(cfg: &Config) -> Result<()> {
    let db = cfg.database()?;
    let dump_file = runner::dump_filename(&timefmt::current_timestamp());
    let args = runner::pg_dump_args(&db, &dump_file);

    let outcome = ui::run_stage(
        "Dump database",
        &args,
        &[("PGPASSWORD", db.password.clone())],
    );
    outcome.print();

    if outcome.failed() {
        return Err(BackupError::Subprocess(format!(
            "pg_dump failed for database '{}'",
            db.name
        ))
        .into());
    }

    println!("Database '{}' dumped to {}.", db.name, dump_file);
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
