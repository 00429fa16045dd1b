//! Resolves bucket urls (`gs://`, `s3://`, `file://`) into writable handles.
//!
//! Every handle carries the path of its url as key prefix, so all writes
//! through one handle end up below the same "directory".
use crate::data_backends::{
    filesystem_backend::FSBackend,
    gcs_backend::GcsBackend,
    s3_backend::{S3Backend, S3Settings},
    storage_backend::StorageBackend,
};
use crate::error::BackupError;
use async_trait::async_trait;
use bytes::Bytes;
use std::{fmt::Display, path::PathBuf, str::FromStr};
use url::Url;

/// The supported bucket providers, keyed by url scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Gs,
    S3,
    File,
}

impl FromStr for Scheme {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gs" => Ok(Scheme::Gs),
            "s3" => Ok(Scheme::S3),
            "file" => Ok(Scheme::File),
            other => Err(BackupError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scheme::Gs => write!(f, "gs"),
            Scheme::S3 => write!(f, "s3"),
            Scheme::File => write!(f, "file"),
        }
    }
}

/// One variant per provider, selected once from the url scheme
#[derive(Debug)]
pub enum Backend {
    Gcs(GcsBackend),
    S3(S3Backend),
    Fs(FSBackend),
}

#[async_trait]
impl StorageBackend for Backend {
    async fn put_object(&self, key: &str, payload: Bytes) -> Result<u64, BackupError> {
        match self {
            Backend::Gcs(backend) => backend.put_object(key, payload).await,
            Backend::S3(backend) => backend.put_object(key, payload).await,
            Backend::Fs(backend) => backend.put_object(key, payload).await,
        }
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, BackupError> {
        match self {
            Backend::Gcs(backend) => backend.get_object(key).await,
            Backend::S3(backend) => backend.get_object(key).await,
            Backend::Fs(backend) => backend.get_object(key).await,
        }
    }
}

/// An open bucket scoped to a key prefix
#[derive(Debug)]
pub struct Bucket {
    backend: Backend,
    prefix: String,
}

impl Bucket {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn scheme(&self) -> Scheme {
        match self.backend {
            Backend::Gcs(_) => Scheme::Gs,
            Backend::S3(_) => Scheme::S3,
            Backend::Fs(_) => Scheme::File,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Full key of `name` inside the bucket
    pub fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Writes `payload` as object `name` below the prefix and returns the full key
    pub async fn write(&self, name: &str, payload: Bytes) -> Result<(String, u64), BackupError> {
        let key = self.key(name);
        let copied = self.backend.put_object(&key, payload).await?;
        Ok((key, copied))
    }

    /// Reads object `name` below the prefix
    pub async fn read(&self, name: &str) -> Result<Bytes, BackupError> {
        self.backend.get_object(&self.key(name)).await
    }
}

/// Opens a bucket using a bucket url, credentials are taken from the process environment.
/// It will prefix any object stored in it.
pub async fn open_bucket(bucket_url: &str) -> Result<Bucket, BackupError> {
    open_bucket_with(bucket_url, |key| dotenvy::var(key).ok()).await
}

/// Same as [`open_bucket`] but reads provider settings through `lookup`
#[tracing::instrument(level = "debug", skip(lookup))]
pub async fn open_bucket_with<F>(bucket_url: &str, lookup: F) -> Result<Bucket, BackupError>
where
    F: Fn(&str) -> Option<String>,
{
    let url = parse_bucket_url(bucket_url)?;
    let scheme = Scheme::from_str(url.scheme())?;

    let backend = match scheme {
        Scheme::Gs => Backend::Gcs(GcsBackend::new(bucket_name(&url)?)?),
        Scheme::S3 => {
            let settings = S3Settings::from_lookup(lookup)?;
            Backend::S3(S3Backend::new(bucket_name(&url)?, settings).await)
        }
        Scheme::File => Backend::Fs(FSBackend::new(file_root(&url))),
    };

    Ok(Bucket {
        backend,
        prefix: bucket_path(url.path()),
    })
}

pub fn parse_bucket_url(bucket_url: &str) -> Result<Url, BackupError> {
    Url::parse(bucket_url).map_err(|e| BackupError::InvalidUrl(format!("{bucket_url}: {e}")))
}

fn bucket_name(url: &Url) -> Result<String, BackupError> {
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BackupError::InvalidUrl(format!("{url}: missing bucket name")))
}

// file:///abs/path is rooted at `/`, file://dir/path at the relative directory `dir`
fn file_root(url: &Url) -> PathBuf {
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"))
}

/// Turns a url path into a key prefix: no leading slash, lexically cleaned,
/// trailing slash. An empty path yields an empty prefix.
pub fn bucket_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return String::new();
    }
    format!("{}/", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_vars(key: &str) -> Option<String> {
        match key {
            "S3_KEY" => Some("key".to_string()),
            "S3_SECRET" => Some("secret".to_string()),
            "S3_REGION" => Some("eu-central-1".to_string()),
            _ => None,
        }
    }

    #[test]
    fn bucket_path_test() {
        assert_eq!(bucket_path(""), "");
        assert_eq!(bucket_path("/"), "");
        assert_eq!(bucket_path("/backups"), "backups/");
        assert_eq!(bucket_path("///backups/"), "backups/");
        assert_eq!(bucket_path("/a//b/./c"), "a/b/c/");
        assert_eq!(bucket_path("/a/b/../c"), "a/c/");
        assert_eq!(bucket_path("/../a"), "a/");
    }

    #[test]
    fn scheme_parsing() {
        assert_eq!(Scheme::from_str("gs").unwrap(), Scheme::Gs);
        assert_eq!(Scheme::from_str("s3").unwrap(), Scheme::S3);
        assert_eq!(Scheme::from_str("file").unwrap(), Scheme::File);
        assert!(matches!(
            Scheme::from_str("azblob"),
            Err(BackupError::UnsupportedProvider(p)) if p == "azblob"
        ));
    }

    #[tokio::test]
    async fn file_bucket_is_scoped_to_path() {
        let bucket = open_bucket_with("file:///tmp/b/backups", |_| None)
            .await
            .unwrap();
        assert_eq!(bucket.scheme(), Scheme::File);
        assert_eq!(bucket.prefix(), "tmp/b/backups/");
        assert_eq!(
            bucket.key("channel-backup-1"),
            "tmp/b/backups/channel-backup-1"
        );
        match bucket.backend() {
            Backend::Fs(fs) => assert_eq!(fs.base_path, PathBuf::from("/")),
            other => panic!("unexpected backend {other:?}"),
        }
    }

    #[tokio::test]
    async fn s3_bucket_is_scoped_to_path() {
        let bucket = open_bucket_with("s3://my-bucket/node-1/backups/", s3_vars)
            .await
            .unwrap();
        assert_eq!(bucket.scheme(), Scheme::S3);
        assert_eq!(bucket.prefix(), "node-1/backups/");
        match bucket.backend() {
            Backend::S3(s3) => assert_eq!(s3.bucket, "my-bucket"),
            other => panic!("unexpected backend {other:?}"),
        }
    }

    #[tokio::test]
    async fn gs_bucket_is_scoped_to_path() {
        let bucket = open_bucket_with("gs://my-bucket/lnd", |_| None)
            .await
            .unwrap();
        assert_eq!(bucket.scheme(), Scheme::Gs);
        assert_eq!(bucket.prefix(), "lnd/");
    }

    #[tokio::test]
    async fn s3_without_credentials_fails() {
        let err = open_bucket_with("s3://my-bucket/backups", |_| None)
            .await
            .unwrap_err();
        match err {
            BackupError::MissingCredentials(missing) => {
                assert_eq!(missing, vec!["S3_KEY", "S3_SECRET", "S3_REGION"])
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsupported_scheme_fails() {
        let err = open_bucket_with("azblob://container/backups", |_| None)
            .await
            .unwrap_err();
        assert!(matches!(err, BackupError::UnsupportedProvider(_)));
    }

    #[tokio::test]
    async fn unparseable_url_fails() {
        let err = open_bucket_with("not a url", |_| None).await.unwrap_err();
        assert!(matches!(err, BackupError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn missing_bucket_name_fails() {
        let err = open_bucket_with("s3:///backups", s3_vars).await.unwrap_err();
        assert!(matches!(err, BackupError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn resolving_twice_gives_same_prefix() {
        let first = open_bucket_with("s3://my-bucket/a/b", s3_vars).await.unwrap();
        let second = open_bucket_with("s3://my-bucket/a/b", s3_vars).await.unwrap();
        assert_eq!(first.prefix(), second.prefix());
        assert_eq!(first.key("x"), second.key("x"));
    }
}
