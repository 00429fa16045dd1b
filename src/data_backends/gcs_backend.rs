use super::storage_backend::StorageBackend;
use crate::error::BackupError;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder},
    path::Path,
    ObjectStore, PutPayload,
};
use tracing::error;

#[derive(Debug)]
pub struct GcsBackend {
    store: GoogleCloudStorage,
    pub bucket: String,
}

impl GcsBackend {
    /// Opens the bucket with the ambient default credentials:
    /// service account settings from `GOOGLE_*` variables, the gcloud
    /// application default credentials file or the instance metadata server.
    #[tracing::instrument(level = "debug")]
    pub fn new(bucket: String) -> Result<Self, BackupError> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(&bucket)
            .build()
            .map_err(|e| {
                error!(error = ?e, msg = e.to_string());
                BackupError::ConnectionFailure(format!("cannot open gcs bucket {bucket}: {e}"))
            })?;

        Ok(GcsBackend { store, bucket })
    }
}

// Data backend for Google Cloud Storage.
#[async_trait]
impl StorageBackend for GcsBackend {
    #[tracing::instrument(level = "trace", skip(self, payload))]
    async fn put_object(&self, key: &str, payload: Bytes) -> Result<u64, BackupError> {
        let len = payload.len() as u64;
        match self
            .store
            .put(&Path::from(key), PutPayload::from(payload))
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
        let result = self.store.get(&Path::from(key)).await.map_err(|e| {
            error!(error = ?e, "Error getting object");
            BackupError::read(key, e)
        })?;

        result.bytes().await.map_err(|e| {
            error!(error = ?e, msg = e.to_string());
            BackupError::read(key, e)
        })
    }
}
