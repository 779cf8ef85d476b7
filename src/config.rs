//! Configuration types and env-file loading.
//!
//! All settings live in a single key/value env file (default:
//! `doks_utils.env` in the current directory).  The file is parsed with
//! `dotenvy` but the process environment is **never** mutated — every value
//! flows through the [`Config`] struct, which is built once in `main` and
//! passed by reference into each command.  No component reads ambient
//! global state.
//!
//! # File format
//!
//! ```text
//! # S3 Configuration
//! AWS_PROFILE=default
//! AWS_ACCESS_KEY_ID=
//! AWS_SECRET_ACCESS_KEY=
//! AWS_REGION=us-east-1
//! LOCAL_DOWNLOAD_DIR=./download
//!
//! # Download concurrency (optional; defaults to CPU count minus two)
//! DOWNLOAD_CONCURRENCY=
//!
//! # PostgreSQL Configuration
//! POSTGRES_DB=my-db-name
//! POSTGRES_USER=my-username
//! POSTGRES_PASSWORD=my-password
//! POSTGRES_HOST=localhost
//! POSTGRES_PORT=5432
//! ```
//!
//! Empty values count as unset.  Storage and database settings are validated
//! lazily ([`Config::storage`] / [`Config::database`]) so that a database
//! dump does not require AWS credentials and vice versa.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{download, error::BackupError};

/// Contents of the generated template env file.
///
/// Mirrors the keys read by [`Config::from_pairs`]; the AWS profile default
/// makes the tool usable out of the box on machines with a configured
/// `~/.aws/credentials`.
pub const TEMPLATE: &str = "\
# S3 Configuration
AWS_PROFILE=default
AWS_ACCESS_KEY_ID=
AWS_SECRET_ACCESS_KEY=
AWS_REGION=us-east-1
LOCAL_DOWNLOAD_DIR=./download

# Download concurrency (optional; defaults to CPU count minus two)
DOWNLOAD_CONCURRENCY=

# PostgreSQL Configuration
POSTGRES_DB=my-db-name
POSTGRES_USER=my-username
POSTGRES_PASSWORD=my-password
POSTGRES_HOST=localhost
POSTGRES_PORT=5432
";

// ─── Resolved sections ────────────────────────────────────────────────────────

/// How the S3 client should authenticate.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageCredentials {
    /// Explicit access-key pair from the env file.
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
    /// Named profile resolved through the shared AWS config chain.
    Profile(String),
}

/// Validated storage settings, produced by [`Config::storage`].
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub credentials: StorageCredentials,
    pub region: String,
}

/// Validated database settings, produced by [`Config::database`].
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub name: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

// ─── Top-level ────────────────────────────────────────────────────────────────

/// Parsed env file.  Fields that are only needed by some commands stay
/// optional here and are validated by the accessor for that command.
#[derive(Debug, Clone)]
pub struct Config {
    profile: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    region: String,

    /// Root directory that receives one subdirectory per bucket.
    pub download_dir: PathBuf,
    /// Worker-pool size for the download phase, already coerced to ≥ 1.
    pub concurrency: usize,

    db_name: Option<String>,
    db_user: Option<String>,
    db_password: Option<String>,
    db_host: String,
    db_port: u16,
}

impl Config {
    /// Validated storage settings.
    ///
    /// An explicit access-key pair wins over a profile.  Returns a
    /// `Configuration` error when neither is present.
    pub fn storage(&self) -> Result<StorageConfig, BackupError> {
        let credentials = match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => StorageCredentials::Static {
                access_key_id: id.clone(),
                secret_access_key: secret.clone(),
            },
            _ => match &self.profile {
                Some(name) => StorageCredentials::Profile(name.clone()),
                None => {
                    return Err(BackupError::Configuration(
                        "provide AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY or AWS_PROFILE \
                         in your env file"
                            .into(),
                    ));
                },
            },
        };
        Ok(StorageConfig {
            credentials,
            region: self.region.clone(),
        })
    }

    /// Validated database settings.
    pub fn database(&self) -> Result<DatabaseConfig, BackupError> {
        match (&self.db_name, &self.db_user, &self.db_password) {
            (Some(name), Some(user), Some(password)) => Ok(DatabaseConfig {
                name: name.clone(),
                user: user.clone(),
                password: password.clone(),
                host: self.db_host.clone(),
                port: self.db_port,
            }),
            _ => Err(BackupError::Configuration(
                "POSTGRES_DB, POSTGRES_USER, and POSTGRES_PASSWORD must be set \
                 in your env file"
                    .into(),
            )),
        }
    }

    /// Build a `Config` from already-parsed key/value pairs.
    ///
    /// Only numeric fields can fail here; presence checks are deferred to
    /// the lazy accessors.
    pub fn from_pairs(pairs: &HashMap<String, String>) -> Result<Self, BackupError> {
        let get = |key: &str| -> Option<String> {
            pairs
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let concurrency = match get("DOWNLOAD_CONCURRENCY") {
            None => download::default_concurrency(),
            Some(raw) => {
                let n: i64 = raw.parse().map_err(|_| {
                    BackupError::Configuration(format!(
                        "DOWNLOAD_CONCURRENCY must be a number, got '{raw}'"
                    ))
                })?;
                // Zero or negative would stall the worker pool.
                if n < 1 { 1 } else { n as usize }
            },
        };

        let db_port = match get("POSTGRES_PORT") {
            None => 5432,
            Some(raw) => raw.parse().map_err(|_| {
                BackupError::Configuration(format!("POSTGRES_PORT must be a port, got '{raw}'"))
            })?,
        };

        Ok(Self {
            profile: get("AWS_PROFILE"),
            access_key_id: get("AWS_ACCESS_KEY_ID"),
            secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
            region: get("AWS_REGION").unwrap_or_else(|| "us-east-1".into()),
            download_dir: get("LOCAL_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./download")),
            concurrency,
            db_name: get("POSTGRES_DB"),
            db_user: get("POSTGRES_USER"),
            db_password: get("POSTGRES_PASSWORD"),
            db_host: get("POSTGRES_HOST").unwrap_or_else(|| "localhost".into()),
            db_port,
        })
    }
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Read and parse a [`Config`] from the env file at `path`.
///
/// If the file does not exist, a template is written in its place and a
/// `Configuration` error is returned telling the user to fill it out and
/// retry — the first-run workflow.
pub fn load(path: &Path) -> Result<Config, BackupError> {
    if !path.exists() {
        write_template(path)?;
        return Err(BackupError::Configuration(format!(
            "{} not found. A template has been created. Please fill it out and retry.",
            path.display()
        )));
    }

    let mut pairs = HashMap::new();
    for item in dotenvy::from_path_iter(path)
        .map_err(|e| BackupError::Configuration(format!("reading {}: {e}", path.display())))?
    {
        let (key, value) = item
            .map_err(|e| BackupError::Configuration(format!("parsing {}: {e}", path.display())))?;
        pairs.insert(key, value);
    }

    Config::from_pairs(&pairs)
}

/// Write the template env file at `path`.
pub fn write_template(path: &Path) -> Result<(), BackupError> {
    std::fs::write(path, TEMPLATE).map_err(|e| BackupError::filesystem(path, e))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn write_env(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{content}").unwrap();
        f
    }

    // ── Defaults ─────────────────────────────────────────────────────────────

    #[test]
    fn empty_pairs_fill_in_defaults() {
        let cfg = Config::from_pairs(&pairs(&[])).unwrap();
        assert_eq!(cfg.region, "us-east-1");
        assert_eq!(cfg.download_dir, PathBuf::from("./download"));
        assert_eq!(cfg.db_host, "localhost");
        assert_eq!(cfg.db_port, 5432);
        assert!(cfg.concurrency >= 1);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let cfg = Config::from_pairs(&pairs(&[("AWS_PROFILE", ""), ("AWS_REGION", "  ")])).unwrap();
        assert!(cfg.profile.is_none());
        assert_eq!(cfg.region, "us-east-1");
    }

    // ── Concurrency coercion ─────────────────────────────────────────────────

    #[test]
    fn zero_concurrency_is_coerced_to_one() {
        let cfg = Config::from_pairs(&pairs(&[("DOWNLOAD_CONCURRENCY", "0")])).unwrap();
        assert_eq!(cfg.concurrency, 1);
    }

    #[test]
    fn negative_concurrency_is_coerced_to_one() {
        let cfg = Config::from_pairs(&pairs(&[("DOWNLOAD_CONCURRENCY", "-4")])).unwrap();
        assert_eq!(cfg.concurrency, 1);
    }

    #[test]
    fn explicit_concurrency_is_respected() {
        let cfg = Config::from_pairs(&pairs(&[("DOWNLOAD_CONCURRENCY", "8")])).unwrap();
        assert_eq!(cfg.concurrency, 8);
    }

    #[test]
    fn non_numeric_concurrency_is_rejected() {
        let result = Config::from_pairs(&pairs(&[("DOWNLOAD_CONCURRENCY", "lots")]));
        assert!(matches!(result, Err(BackupError::Configuration(_))));
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let result = Config::from_pairs(&pairs(&[("POSTGRES_PORT", "fivefour32")]));
        assert!(matches!(result, Err(BackupError::Configuration(_))));
    }

    // ── Storage resolution ───────────────────────────────────────────────────

    #[test]
    fn key_pair_wins_over_profile() {
        let cfg = Config::from_pairs(&pairs(&[
            ("AWS_PROFILE", "default"),
            ("AWS_ACCESS_KEY_ID", "AKIA123"),
            ("AWS_SECRET_ACCESS_KEY", "s3cr3t"),
        ]))
        .unwrap();
        let storage = cfg.storage().unwrap();
        assert_eq!(storage.credentials, StorageCredentials::Static {
            access_key_id: "AKIA123".into(),
            secret_access_key: "s3cr3t".into(),
        });
    }

    #[test]
    fn profile_used_when_no_key_pair() {
        let cfg = Config::from_pairs(&pairs(&[("AWS_PROFILE", "backup")])).unwrap();
        let storage = cfg.storage().unwrap();
        assert_eq!(
            storage.credentials,
            StorageCredentials::Profile("backup".into())
        );
    }

    #[test]
    fn missing_credentials_is_a_configuration_error() {
        let cfg = Config::from_pairs(&pairs(&[])).unwrap();
        assert!(matches!(cfg.storage(), Err(BackupError::Configuration(_))));
    }

    #[test]
    fn incomplete_key_pair_falls_back_to_profile() {
        // Only the key id, no secret: the pair is unusable.
        let cfg = Config::from_pairs(&pairs(&[
            ("AWS_ACCESS_KEY_ID", "AKIA123"),
            ("AWS_PROFILE", "default"),
        ]))
        .unwrap();
        let storage = cfg.storage().unwrap();
        assert_eq!(
            storage.credentials,
            StorageCredentials::Profile("default".into())
        );
    }

    // ── Database resolution ──────────────────────────────────────────────────

    #[test]
    fn complete_database_settings_resolve() {
        let cfg = Config::from_pairs(&pairs(&[
            ("POSTGRES_DB", "appdb"),
            ("POSTGRES_USER", "backup"),
            ("POSTGRES_PASSWORD", "hunter2"),
            ("POSTGRES_HOST", "db.example.com"),
            ("POSTGRES_PORT", "5433"),
        ]))
        .unwrap();
        let db = cfg.database().unwrap();
        assert_eq!(db.name, "appdb");
        assert_eq!(db.host, "db.example.com");
        assert_eq!(db.port, 5433);
    }

    #[test]
    fn missing_database_password_is_a_configuration_error() {
        let cfg = Config::from_pairs(&pairs(&[
            ("POSTGRES_DB", "appdb"),
            ("POSTGRES_USER", "backup"),
        ]))
        .unwrap();
        assert!(matches!(cfg.database(), Err(BackupError::Configuration(_))));
    }

    #[test]
    fn database_only_config_does_not_need_aws_settings() {
        let cfg = Config::from_pairs(&pairs(&[
            ("POSTGRES_DB", "appdb"),
            ("POSTGRES_USER", "backup"),
            ("POSTGRES_PASSWORD", "pw"),
        ]))
        .unwrap();
        assert!(cfg.database().is_ok());
    }

    // ── load ─────────────────────────────────────────────────────────────────

    #[test]
    fn load_parses_a_valid_env_file() {
        let f = write_env(
            "AWS_PROFILE=backup\n\
             LOCAL_DOWNLOAD_DIR=/tmp/dl\n\
             DOWNLOAD_CONCURRENCY=3\n",
        );
        let cfg = load(f.path()).unwrap();
        assert_eq!(cfg.download_dir, PathBuf::from("/tmp/dl"));
        assert_eq!(cfg.concurrency, 3);
    }

    #[test]
    fn load_scaffolds_a_template_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doks_utils.env");

        let result = load(&path);
        assert!(matches!(result, Err(BackupError::Configuration(_))));
        assert!(path.exists(), "a template should have been written");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("AWS_PROFILE"));
        assert!(content.contains("POSTGRES_DB"));
    }

    #[test]
    fn template_itself_parses_cleanly() {
        let f = write_env(TEMPLATE);
        let cfg = load(f.path()).unwrap();
        // The template's profile default must resolve.
        assert_eq!(
            cfg.storage().unwrap().credentials,
            StorageCredentials::Profile("default".into())
        );
        // Placeholder database values are present, so resolution succeeds.
        assert!(cfg.database().is_ok());
    }
}
