use crate::error::BackupError;
use crate::logerr;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::storage_backend::StorageBackend;

#[derive(Debug, Clone)]
pub struct FSBackend {
    pub base_path: PathBuf,
}

impl FSBackend {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        FSBackend {
            base_path: base_path.into(),
        }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn check_and_create_parent(&self, path: &Path, key: &str) -> Result<(), BackupError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    tracing::error!(error = ?e, msg = e.to_string());
                    BackupError::write(key, e)
                })?;
            }
        }
        Ok(())
    }
}

// Data backend for a local directory tree.
#[async_trait]
impl StorageBackend for FSBackend {
    #[tracing::instrument(level = "trace", skip(self, payload))]
    async fn put_object(&self, key: &str, payload: Bytes) -> Result<u64, BackupError> {
        let path = self.object_path(key);
        self.check_and_create_parent(&path, key).await?;

        let mut file = tokio::fs::File::create(&path).await.map_err(|e| {
            tracing::error!(error = ?e, msg = e.to_string());
            BackupError::write(key, e)
        })?;

        file.write_all(&payload)
            .await
            .inspect_err(logerr!())
            .map_err(|e| BackupError::write(key, e))?;
        file.flush()
            .await
            .inspect_err(logerr!())
            .map_err(|e| BackupError::write(key, e))?;

        Ok(payload.len() as u64)
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn get_object(&self, key: &str) -> Result<Bytes, BackupError> {
        let data = tokio::fs::read(self.object_path(key)).await.map_err(|e| {
            tracing::error!(error = ?e, msg = e.to_string());
            BackupError::read(key, e)
        })?;
        Ok(Bytes::from(data))
    }
}
