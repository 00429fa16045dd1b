use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use lnd_backup::error::BackupError;
use lnd_backup::runner::{BackupSink, BackupSource, BackupStream};
use lnd_backup::uploader::Uploader;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn file_url(dir: &Path, prefix: &str) -> String {
    format!("file://{}/{}", dir.display(), prefix)
}

/// Node stand-in with a fixed snapshot and a finite list of updates
pub struct ScriptedNode {
    pub snapshot: Result<Bytes, String>,
    pub updates: Mutex<Vec<Bytes>>,
}

impl ScriptedNode {
    pub fn new(snapshot: &'static [u8], updates: &[&'static [u8]]) -> Self {
        ScriptedNode {
            snapshot: Ok(Bytes::from_static(snapshot)),
            updates: Mutex::new(updates.iter().map(|u| Bytes::from_static(*u)).collect()),
        }
    }

    pub fn unreachable() -> Self {
        ScriptedNode {
            snapshot: Err("simulated rpc error".to_string()),
            updates: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BackupSource for ScriptedNode {
    async fn fetch_snapshot(&self) -> Result<Bytes, BackupError> {
        self.snapshot.clone().map_err(BackupError::ConnectionFailure)
    }

    async fn subscribe(&self) -> Result<BackupStream, BackupError> {
        let updates = std::mem::take(&mut *self.updates.lock().unwrap());
        Ok(stream::iter(updates.into_iter().map(Ok)).boxed())
    }
}

/// Real uploader that fails the n-th call (1 based) with a write error
pub struct FlakyUploader {
    pub inner: Uploader,
    pub fail_call: usize,
    pub calls: AtomicUsize,
}

#[async_trait]
impl BackupSink for FlakyUploader {
    async fn upload(&self, payload: Bytes) -> Result<String, BackupError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_call {
            return Err(BackupError::WriteFailure {
                key: "channel-backup".to_string(),
                error: "simulated write error".to_string(),
            });
        }
        // keep object names apart
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        self.inner.upload(payload).await
    }
}

pub fn stored_objects(dir: &Path) -> Vec<Vec<u8>> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    entries.sort();
    entries
        .into_iter()
        .map(|path| std::fs::read(path).unwrap())
        .collect()
}

/// Writes an lnd style certificate (self-signed, CA flag set) plus a macaroon
/// into `dir` and serves that certificate on a local port for one connection.
/// The receiver reports whether the TLS handshake completed.
pub async fn serve_node_tls_once(dir: &Path) -> (u16, tokio::sync::oneshot::Receiver<bool>) {
    use rcgen::{BasicConstraints, CertificateParams, IsCa, KeyPair};
    use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};

    let mut params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let key = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key).unwrap();
    std::fs::write(dir.join("tls.cert"), cert.pem()).unwrap();
    std::fs::write(dir.join("admin.macaroon"), [0x02, 0x01, 0x03]).unwrap();

    let mut config = rustls::ServerConfig::builder_with_provider(std::sync::Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(
        vec![cert.der().clone()],
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der())),
    )
    .unwrap();
    config.alpn_protocols = vec![b"h2".to_vec()];
    let acceptor = tokio_rustls::TlsAcceptor::from(std::sync::Arc::new(config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let _ = tx.send(acceptor.accept(tcp).await.is_ok());
    });

    (port, rx)
}
