//! The backup event loop: initial snapshot, then one upload per update
//! until a stop is requested or the subscription ends.
use crate::error::BackupError;
use crate::shutdown::{InFlight, ShutdownSignal};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tracing::{error, info, warn};

pub type BackupStream = BoxStream<'static, Result<Bytes, BackupError>>;

/// Where backups come from
#[async_trait]
pub trait BackupSource: Send + Sync {
    /// Current full multi channel backup
    async fn fetch_snapshot(&self) -> Result<Bytes, BackupError>;

    /// Stream of multi channel backups, one per channel change
    async fn subscribe(&self) -> Result<BackupStream, BackupError>;
}

/// Where backups go, returns the key of the stored object
#[async_trait]
pub trait BackupSink: Send + Sync {
    async fn upload(&self, payload: Bytes) -> Result<String, BackupError>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub uploaded: usize,
    pub failed: usize,
    /// Uploads given up on because shutdown timed out
    pub abandoned: usize,
}

enum Outcome {
    Uploaded(String),
    Failed(BackupError),
    Abandoned,
}

pub struct EventLoop<S, K> {
    source: S,
    sink: K,
    shutdown: ShutdownSignal,
    in_flight: InFlight,
    shutdown_timeout: Duration,
}

impl<S: BackupSource, K: BackupSink> EventLoop<S, K> {
    pub fn new(source: S, sink: K, shutdown: ShutdownSignal) -> Self {
        EventLoop {
            source,
            sink,
            shutdown,
            in_flight: Arc::new(AtomicBool::new(false)),
            shutdown_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_in_flight(mut self, in_flight: InFlight) -> Self {
        self.in_flight = in_flight;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn in_flight(&self) -> InFlight {
        self.in_flight.clone()
    }

    /// Runs until shutdown or until the node closes the subscription.
    /// Failing to fetch or store the initial snapshot is fatal, failed
    /// updates are logged and skipped.
    pub async fn run(mut self) -> Result<RunSummary, BackupError> {
        let mut summary = RunSummary::default();

        info!("Initial backup");
        let snapshot = self.source.fetch_snapshot().await.map_err(|e| {
            error!(error = %e, "cannot fetch initial channel backup");
            e
        })?;
        self.sink.upload(snapshot).await.map_err(|e| {
            error!(error = %e, "cannot upload initial channel backup");
            e
        })?;
        summary.uploaded += 1;

        let mut updates = self.source.subscribe().await?;
        info!("Subscribed to channel backups");

        loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.triggered() => break,
                next = updates.next() => next,
            };

            let payload = match next {
                Some(Ok(payload)) => payload,
                Some(Err(err)) => {
                    error!(error = %err, "channel backup subscription failed");
                    return Err(err);
                }
                None => {
                    info!("channel backup subscription closed by node");
                    break;
                }
            };

            match self.upload_update(payload).await {
                Outcome::Uploaded(key) => {
                    summary.uploaded += 1;
                    info!(key = %key, "channel backup stored");
                }
                Outcome::Failed(err) => {
                    summary.failed += 1;
                    error!(error = %err, "channel backup upload failed, backup is lost");
                }
                Outcome::Abandoned => {
                    summary.abandoned += 1;
                    break;
                }
            }
        }

        info!(
            uploaded = summary.uploaded,
            failed = summary.failed,
            abandoned = summary.abandoned,
            "stopped reading backup updates"
        );
        Ok(summary)
    }

    // A stop during the upload grants it `shutdown_timeout` to finish
    async fn upload_update(&mut self, payload: Bytes) -> Outcome {
        self.in_flight.store(true, Ordering::SeqCst);

        let upload = self.sink.upload(payload);
        tokio::pin!(upload);

        let result = tokio::select! {
            result = &mut upload => Some(result),
            _ = self.shutdown.triggered() => {
                info!(timeout = ?self.shutdown_timeout, "waiting for pending backup");
                tokio::time::timeout(self.shutdown_timeout, &mut upload).await.ok()
            }
        };

        self.in_flight.store(false, Ordering::SeqCst);

        match result {
            Some(Ok(key)) => Outcome::Uploaded(key),
            Some(Err(err)) => Outcome::Failed(err),
            None => {
                warn!("shutdown timeout reached, pending channel backup was not stored");
                Outcome::Abandoned
            }
        }
    }
}
