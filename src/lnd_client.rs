use crate::api::lnrpc::{
    lightning_client::LightningClient, ChanBackupExportRequest, ChanBackupSnapshot,
    ChannelBackupSubscription, GetInfoRequest, GetInfoResponse,
};
use crate::config::{Config, Network};
use crate::error::BackupError;
use crate::runner::{BackupSource, BackupStream};
use crate::tls::NodeConnector;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue};
use tonic::transport::Channel;
use tonic::Request;
use tracing::{debug, info};

/// Largest message accepted from the node, ~50MB
pub const MAX_MSG_RECV_SIZE: usize = 50 * 1024 * 1024;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection to the `lnrpc.Lightning` service of an lnd node
#[derive(Debug, Clone)]
pub struct LndClient {
    lightning: LightningClient<Channel>,
    macaroon: String,
}

impl LndClient {
    /// Connects with the node's tls certificate pinned and checks that the
    /// node runs on the configured network.
    #[tracing::instrument(level = "debug", skip(config))]
    pub async fn connect(config: &Config) -> Result<Self, BackupError> {
        let cert = read_file(&config.tls_cert_file(), "tls certificate").await?;
        let macaroon = read_file(&config.macaroon_file(), "macaroon").await?;

        let connector = NodeConnector::new(&cert)?;
        let endpoint = Channel::from_shared(config.rpc_address())
            .map_err(|e| BackupError::ConnectionFailure(format!("invalid rpc address: {e}")))?
            .connect_timeout(CONNECT_TIMEOUT);
        let channel = endpoint.connect_with_connector(connector).await.map_err(|e| {
            tracing::error!(error = ?e, msg = e.to_string());
            BackupError::ConnectionFailure(format!(
                "cannot reach {}: {e}",
                config.rpc_address()
            ))
        })?;

        let client = LndClient {
            lightning: LightningClient::new(channel).max_decoding_message_size(MAX_MSG_RECV_SIZE),
            macaroon: hex::encode(macaroon),
        };

        let info = client.get_info().await?;
        check_network(&info, config.network)?;
        info!(
            alias = %info.alias,
            version = %info.version,
            pubkey = %info.identity_pubkey,
            block_height = info.block_height,
            "connected to lightning node"
        );

        Ok(client)
    }

    pub async fn get_info(&self) -> Result<GetInfoResponse, BackupError> {
        let req = authorized(&self.macaroon, GetInfoRequest {})?;
        Ok(self.lightning.clone().get_info(req).await?.into_inner())
    }
}

#[async_trait]
impl BackupSource for LndClient {
    async fn fetch_snapshot(&self) -> Result<Bytes, BackupError> {
        let req = authorized(&self.macaroon, ChanBackupExportRequest {})?;
        let snapshot = self
            .lightning
            .clone()
            .export_all_channel_backups(req)
            .await?
            .into_inner();
        multi_chan_backup(snapshot)
    }

    async fn subscribe(&self) -> Result<BackupStream, BackupError> {
        let req = authorized(&self.macaroon, ChannelBackupSubscription {})?;
        let stream = self
            .lightning
            .clone()
            .subscribe_channel_backups(req)
            .await?
            .into_inner();

        Ok(stream
            .map(|update| update.map_err(BackupError::from).and_then(multi_chan_backup))
            .boxed())
    }
}

async fn read_file(path: &Path, what: &str) -> Result<Vec<u8>, BackupError> {
    tokio::fs::read(path).await.map_err(|e| {
        tracing::error!(error = ?e, msg = e.to_string());
        BackupError::ConnectionFailure(format!("cannot read {what} {}: {e}", path.display()))
    })
}

/// Wraps `message` into a request carrying the hex encoded macaroon
pub fn authorized<T>(macaroon: &str, message: T) -> Result<Request<T>, BackupError> {
    let mut req = Request::new(message);
    req.metadata_mut().append(
        AsciiMetadataKey::from_bytes("macaroon".as_bytes())
            .map_err(|e| BackupError::ConnectionFailure(e.to_string()))?,
        AsciiMetadataValue::try_from(macaroon)
            .map_err(|e| BackupError::ConnectionFailure(e.to_string()))?,
    );
    Ok(req)
}

/// Extracts the multi channel backup blob from a snapshot
pub fn multi_chan_backup(snapshot: ChanBackupSnapshot) -> Result<Bytes, BackupError> {
    let multi = snapshot.multi_chan_backup.ok_or_else(|| {
        BackupError::ConnectionFailure("snapshot without multi channel backup".to_string())
    })?;
    debug!(
        channels = multi.chan_points.len(),
        length = multi.multi_chan_backup.len(),
        "received channel backup"
    );
    Ok(Bytes::from(multi.multi_chan_backup))
}

fn check_network(info: &GetInfoResponse, network: Network) -> Result<(), BackupError> {
    match info.chains.first() {
        Some(chain) if chain.network != network.to_string() => {
            Err(BackupError::ConnectionFailure(format!(
                "network mismatch: node runs on {}, configured {}",
                chain.network, network
            )))
        }
        _ => Ok(()),
    }
}
