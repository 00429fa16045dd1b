//! TLS transport for the node connection.
//!
//! lnd signs its `tls.cert` itself and marks it as a CA, which webpki refuses
//! as a server certificate. The node's certificate is therefore pinned: the
//! handshake succeeds only when the node presents exactly one of the
//! certificates found in the configured file.
use crate::error::BackupError;
use futures::future::BoxFuture;
use hyper_util::rt::TokioIo;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, ClientConfig, DigitallySignedStruct, SignatureScheme};
use std::io;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::net::TcpStream;
use tokio_rustls::{client::TlsStream, TlsConnector};
use tonic::transport::Uri;
use tower::Service;

/// Server name sent to the node, lnd always lists it in its certificate
pub const NODE_DOMAIN: &str = "localhost";

const DEFAULT_RPC_PORT: u16 = 10009;

/// Reads all certificates of a PEM file
pub fn parse_certificates(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, BackupError> {
    let certs = rustls_pemfile::certs(&mut &pem[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| BackupError::ConnectionFailure(format!("invalid tls certificate: {e}")))?;
    if certs.is_empty() {
        return Err(BackupError::ConnectionFailure(
            "no certificate found in tls certificate file".to_string(),
        ));
    }
    Ok(certs)
}

/// Accepts the server if its leaf certificate is one of `certs`
#[derive(Debug)]
struct PinnedCertVerifier {
    certs: Vec<CertificateDer<'static>>,
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for PinnedCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        if self
            .certs
            .iter()
            .any(|cert| cert.as_ref() == end_entity.as_ref())
        {
            Ok(ServerCertVerified::assertion())
        } else {
            tracing::warn!("node presented a certificate that differs from the pinned one");
            Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Client config pinned to the certificates in `cert_pem`, speaking h2 only.
/// The ring provider is passed explicitly, so no process default is needed.
pub fn pinned_client_config(cert_pem: &[u8]) -> Result<ClientConfig, BackupError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = PinnedCertVerifier {
        certs: parse_certificates(cert_pem)?,
        provider: provider.clone(),
    };

    let mut config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| BackupError::ConnectionFailure(e.to_string()))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();
    config.alpn_protocols = vec![b"h2".to_vec()];
    Ok(config)
}

/// Connector handed to tonic: plain TCP to the uri's host and port, then TLS
/// against the pinned certificate.
#[derive(Clone)]
pub struct NodeConnector {
    tls: TlsConnector,
}

impl NodeConnector {
    pub fn new(cert_pem: &[u8]) -> Result<Self, BackupError> {
        Ok(NodeConnector {
            tls: TlsConnector::from(Arc::new(pinned_client_config(cert_pem)?)),
        })
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn connect(&self, uri: &Uri) -> io::Result<TlsStream<TcpStream>> {
        let host = uri
            .host()
            .map(|host| host.trim_start_matches('[').trim_end_matches(']'))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("no host in {uri}"))
            })?;
        let port = uri.port_u16().unwrap_or(DEFAULT_RPC_PORT);

        let tcp = TcpStream::connect((host, port)).await?;
        tcp.set_nodelay(true)?;

        let domain = ServerName::try_from(NODE_DOMAIN)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.tls.connect(domain, tcp).await
    }
}

impl Service<Uri> for NodeConnector {
    type Response = TokioIo<TlsStream<TcpStream>>;
    type Error = io::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let connector = self.clone();
        Box::pin(async move { connector.connect(&uri).await.map(TokioIo::new) })
    }
}
