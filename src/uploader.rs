use crate::bucket::open_bucket;
use crate::error::BackupError;
use crate::runner::BackupSink;
use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

pub const OBJECT_NAME_PREFIX: &str = "channel-backup-";

/// Object name for a backup taken at `millis` since the unix epoch
pub fn object_name_at(millis: i64) -> String {
    format!("{OBJECT_NAME_PREFIX}{millis}")
}

/// Object name for a backup taken now. Two calls within the same millisecond
/// return the same name, a later upload then replaces the earlier one.
pub fn object_name() -> String {
    object_name_at(chrono::Utc::now().timestamp_millis())
}

/// Uploads a multi channel backup blob to the bucket behind `bucket_url`.
/// The bucket is opened for this single write and released afterwards.
/// Returns the full key of the written object.
#[tracing::instrument(level = "debug", skip(payload), fields(len = payload.len()))]
pub async fn upload_backup(bucket_url: &str, payload: Bytes) -> Result<String, BackupError> {
    let bucket = open_bucket(bucket_url).await.map_err(|e| {
        tracing::error!("Failed to open bucket: {}", e);
        e
    })?;

    let name = object_name();
    info!(key = %bucket.key(&name), "uploading channel backup");
    let (key, copied) = bucket.write(&name, payload).await.map_err(|e| {
        tracing::error!("Failed to write {:?}: {}", bucket.key(&name), e);
        e
    })?;
    info!(filename = %key, length = copied, "channel backup uploaded");

    Ok(key)
}

/// Upload target of the event loop: a bucket url plus a bounded retry policy
#[derive(Debug, Clone)]
pub struct Uploader {
    bucket_url: String,
    retries: u32,
    retry_delay: Duration,
}

impl Uploader {
    pub fn new(bucket_url: impl Into<String>) -> Self {
        Uploader {
            bucket_url: bucket_url.into(),
            retries: 0,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_retries(mut self, retries: u32, retry_delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn bucket_url(&self) -> &str {
        &self.bucket_url
    }
}

/// Runs `attempt` until it succeeds, at most `retries + 1` times, sleeping
/// `delay` between two attempts. The last error is returned.
pub async fn retry_upload<F, Fut>(
    retries: u32,
    delay: Duration,
    mut attempt: F,
) -> Result<String, BackupError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, BackupError>>,
{
    let mut failures = 0;
    loop {
        match attempt().await {
            Ok(key) => return Ok(key),
            Err(err) if failures < retries => {
                failures += 1;
                warn!(
                    error = %err,
                    attempt = failures,
                    retries,
                    "upload failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[async_trait]
impl BackupSink for Uploader {
    async fn upload(&self, payload: Bytes) -> Result<String, BackupError> {
        let bucket_url = self.bucket_url.as_str();
        // Bytes clones share the buffer
        retry_upload(self.retries, self.retry_delay, move || {
            upload_backup(bucket_url, payload.clone())
        })
        .await
    }
}
