pub mod filesystem_backend;
pub mod gcs_backend;
pub mod s3_backend;
pub mod storage_backend;
