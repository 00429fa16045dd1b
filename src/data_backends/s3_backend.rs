use super::storage_backend::StorageBackend;
use crate::error::BackupError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use bytes::Bytes;
use std::fmt::Debug;
use tracing::error;

pub const S3_KEY: &str = "S3_KEY";
pub const S3_SECRET: &str = "S3_SECRET";
pub const S3_REGION: &str = "S3_REGION";
pub const S3_ENDPOINT: &str = "S3_ENDPOINT";

/// Static credentials and location of an S3 compatible service
#[derive(Clone, PartialEq)]
pub struct S3Settings {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub endpoint: Option<String>,
}

impl Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl S3Settings {
    /// Collects the settings with the given variable lookup.
    /// Key, secret and region are mandatory, the endpoint is only needed for non AWS services.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BackupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let access_key = read(S3_KEY);
        let secret_key = read(S3_SECRET);
        let region = read(S3_REGION);

        match (access_key, secret_key, region) {
            (Some(access_key), Some(secret_key), Some(region)) => Ok(S3Settings {
                access_key,
                secret_key,
                region,
                endpoint: read(S3_ENDPOINT),
            }),
            (access_key, secret_key, region) => {
                let missing = [
                    (S3_KEY, access_key.is_none()),
                    (S3_SECRET, secret_key.is_none()),
                    (S3_REGION, region.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, missing)| missing.then_some(name))
                .collect();
                Err(BackupError::MissingCredentials(missing))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3Backend {
    pub s3_client: Client,
    pub bucket: String,
}

impl S3Backend {
    #[tracing::instrument(level = "debug")]
    pub async fn new(bucket: String, settings: S3Settings) -> Self {
        let credentials = Credentials::new(
            settings.access_key,
            settings.secret_key,
            None,
            None,
            "lnd-backup",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&config);
        if let Some(endpoint) = settings.endpoint {
            tracing::debug!("S3 Endpoint: {}", endpoint);
            s3_config = s3_config.endpoint_url(endpoint);
        }

        S3Backend {
            s3_client: Client::from_conf(s3_config.build()),
            bucket,
        }
    }
}

// Data backend for an S3 based storage.
#[async_trait]
impl StorageBackend for S3Backend {
    // The payload is already in memory, so it is sent as a single put request
    #[tracing::instrument(level = "trace", skip(self, payload))]
    async fn put_object(&self, key: &str, payload: Bytes) -> Result<u64, BackupError> {
        let len = payload.len() as u64;
        match self
            .s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_length(len as i64)
            .body(ByteStream::from(payload))
            .send()
            .await
        {
            Ok(_) => Ok(len),
            Err(err) => {
                error!(error = ?err, "Error putting object");
                Err(BackupError::write(key, err))
            }
        }
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn get_object(&self, key: &str) -> Result<Bytes, BackupError> {
        let object = match self
            .s3_client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(value) => value,
            Err(err) => {
                error!(error = ?err, "Error getting object");
                return Err(BackupError::read(key, err));
            }
        };

        let data = object.body.collect().await.map_err(|e| {
            error!(error = ?e, msg = e.to_string());
            BackupError::read(key, e)
        })?;
        Ok(data.into_bytes())
    }
}
