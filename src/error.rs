//! Error types for the backup uploader
//! The main error type is `BackupError`
use thiserror::Error;

#[macro_export]
macro_rules! logerr {
    () => {
        |e| {
            tracing::error!("Error: {:?}", e);
        }
    };
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Bucket url invalid: {0}")]
    InvalidUrl(String),
    #[error("Bucket provider invalid: invalid provider {0}")]
    UnsupportedProvider(String),
    #[error("Missing credentials: {} should be set", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),
    #[error("Failed to write {key}: {error}")]
    WriteFailure { key: String, error: String },
    #[error("Failed to read {key}: {error}")]
    ReadFailure { key: String, error: String },
    #[error("Config error: {0}")]
    Config(String),
}

impl BackupError {
    pub(crate) fn write(key: &str, error: impl ToString) -> Self {
        BackupError::WriteFailure {
            key: key.to_string(),
            error: error.to_string(),
        }
    }

    pub(crate) fn read(key: &str, error: impl ToString) -> Self {
        BackupError::ReadFailure {
            key: key.to_string(),
            error: error.to_string(),
        }
    }
}

impl From<tonic::Status> for BackupError {
    fn from(status: tonic::Status) -> Self {
        BackupError::ConnectionFailure(format!(
            "rpc returned {:?}: {}",
            status.code(),
            status.message()
        ))
    }
}

impl From<tonic::transport::Error> for BackupError {
    fn from(error: tonic::transport::Error) -> Self {
        BackupError::ConnectionFailure(error.to_string())
    }
}
