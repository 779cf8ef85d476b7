//! Object-storage access — the `ObjectStore` trait and its S3 implementation.
//!
//! The trait exists so the download coordinator can be exercised against an
//! in-memory store in tests; production code only ever constructs
//! [`S3Store`].  Listing drains the `list_objects_v2` paginator completely so
//! downstream code sees the whole bucket as one `Vec` with a known length
//! (the progress bar needs the total up front).

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;

use crate::{
    config::{StorageConfig, StorageCredentials},
    error::BackupError,
};

/// One object in a bucket listing.
#[derive(Debug, Clone)]
pub struct RemoteObject {
    /// Slash-delimited key.  A trailing slash marks a "folder" placeholder
    /// with no content.
    pub key: String,
    /// Object size in bytes, as reported by the listing.
    pub size: u64,
}

/// Read-only access to a bucket: full listing plus per-object fetch.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every object in `bucket`, in provider-returned order.
    async fn list(&self, bucket: &str) -> Result<Vec<RemoteObject>, BackupError>;

    /// The full byte content of one object.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BackupError>;
}

// ─── S3 ───────────────────────────────────────────────────────────────────────

/// [`ObjectStore`] backed by the AWS S3 SDK.
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Build a client from the resolved storage settings.
    ///
    /// An explicit key pair is turned into static credentials; a profile
    /// name goes through the shared AWS config chain (`~/.aws/credentials`,
    /// SSO, etc.).  The region from the env file is always applied.
    pub async fn connect(storage: &StorageConfig) -> Result<Self, BackupError> {
        let region = Region::new(storage.region.clone());

        let client = match &storage.credentials {
            StorageCredentials::Static {
                access_key_id,
                secret_access_key,
            } => {
                let creds = aws_credential_types::Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None,
                    None,
                    "doks-utils-env",
                );
                let conf = aws_sdk_s3::config::Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .credentials_provider(creds)
                    .region(region)
                    .build();
                Client::from_conf(conf)
            },
            StorageCredentials::Profile(name) => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .profile_name(name)
                    .region(region)
                    .load()
                    .await;
                Client::new(&shared)
            },
        };

        Ok(Self { client })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list(&self, bucket: &str) -> Result<Vec<RemoteObject>, BackupError> {
        let mut objects = Vec::new();
        let mut paginator = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        while let Some(page) = paginator.next().await {
            let page = page.map_err(|e| {
                BackupError::Provider(format!("listing bucket '{bucket}': {e}"))
            })?;
            for obj in page.contents.unwrap_or_default() {
                if let Some(key) = obj.key {
                    objects.push(RemoteObject {
                        key,
                        size: obj.size.unwrap_or(0).max(0) as u64,
                    });
                }
            }
        }

        Ok(objects)
    }

    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BackupError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                BackupError::Provider(format!("fetching '{key}' from '{bucket}': {e}"))
            })?;

        let bytes = resp.body.collect().await.map_err(|e| {
            BackupError::Provider(format!("reading body of '{key}' from '{bucket}': {e}"))
        })?;

        Ok(bytes.into_bytes().to_vec())
    }
}
