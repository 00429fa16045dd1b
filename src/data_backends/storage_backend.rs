use crate::error::BackupError;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

/// A generic backend API for storing and retrieving backup objects
/// Represents a very simple object storage API, keys are already prefixed by the caller
#[async_trait]
pub trait StorageBackend: Debug + Send + Sync {
    /// Writes the payload to the given key and returns the number of bytes copied
    /// # Arguments
    ///
    /// * `key` - The full key of the object inside the bucket
    /// * `payload` - The raw backup blob
    async fn put_object(&self, key: &str, payload: Bytes) -> Result<u64, BackupError>;

    /// Reads the complete object stored under the given key
    /// # Arguments
    ///
    /// * `key` - The full key of the object inside the bucket
    async fn get_object(&self, key: &str) -> Result<Bytes, BackupError>;
}
