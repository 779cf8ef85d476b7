//! `doks-utils config` — scaffold a template env file.

use std::path::Path;

use anyhow::{Result, bail};

use crate::config;

/// Write the template env file at `path`.
///
/// Refuses to overwrite an existing file so a filled-out config is never
/// clobbered by a stray `config` invocation.
pub fn run(path: &Path) -> Result<()> {
    if path.exists() {
        bail!(
            "'{}' already exists — refusing to overwrite. \
             Delete it first if you really want a fresh template.",
            path.display()
        );
    }

    config::write_template(path)?;
    println!("Template configuration created at {}.", path.display());
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_the_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doks_utils.env");

        run(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, config::TEMPLATE);
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doks_utils.env");
        std::fs::write(&path, "# my real settings").unwrap();

        let result = run(&path);
        assert!(result.is_err());
        // The original content must be untouched.
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# my real settings"
        );
    }
}
