use crate::bucket::{parse_bucket_url, Scheme};
use crate::error::BackupError;
use clap::{Parser, ValueEnum};
use std::{fmt::Display, path::PathBuf, str::FromStr, time::Duration};

pub const TLS_CERT_FILE: &str = "tls.cert";
pub const MACAROON_FILE: &str = "admin.macaroon";

/// The chain network the node operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
    Simnet,
    Signet,
}

impl Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
            Network::Simnet => "simnet",
            Network::Signet => "signet",
        };
        write!(f, "{name}")
    }
}

/// Lightning Static Channel Backup.
/// Every flag falls back to the named environment variable, then to its default.
#[derive(Debug, Clone, Parser)]
#[command(name = "lnd-backup", version, about)]
pub struct Config {
    /// Lightning node RPC host
    #[arg(long, env = "RPC_HOST", default_value = "localhost")]
    pub rpc_host: String,

    /// Lightning node RPC port
    #[arg(long, env = "RPC_PORT", default_value_t = 10009)]
    pub rpc_port: u16,

    /// The path to the tls certificate, or the lnd directory containing tls.cert
    #[arg(long, env = "TLS_CERT_PATH", default_value = "/root/.lnd")]
    pub tls_cert_path: PathBuf,

    /// The directory where macaroons are stored [default: <lnd dir>/data/chain/bitcoin/<network>]
    #[arg(long, env = "MACAROON_DIR")]
    pub macaroon_dir: Option<PathBuf>,

    /// The chain network to operate on
    #[arg(long, env = "NETWORK", value_enum, default_value_t = Network::Mainnet)]
    pub network: Network,

    /// The bucket url to backup the snapshot, e.g. gs://bucket/path, s3://bucket/path or file:///path
    #[arg(long, env = "BUCKET_URL")]
    pub bucket_url: String,

    /// Extra attempts for a failed upload, 0 disables retries
    #[arg(long, env = "UPLOAD_RETRIES", default_value_t = 0)]
    pub upload_retries: u32,

    /// Delay between two upload attempts in milliseconds
    #[arg(long, env = "RETRY_DELAY_MS", default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// How long shutdown waits for an upload in flight, in seconds
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = 30)]
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Checks the values clap cannot check on its own
    pub fn validate(&self) -> Result<(), BackupError> {
        if self.rpc_host.trim().is_empty() {
            return Err(BackupError::Config("rpc host cannot be empty".to_string()));
        }
        if self.bucket_url.trim().is_empty() {
            return Err(BackupError::Config("bucket url cannot be empty".to_string()));
        }

        let url = parse_bucket_url(&self.bucket_url)?;
        Scheme::from_str(url.scheme())?;
        Ok(())
    }

    pub fn rpc_address(&self) -> String {
        format!("https://{}:{}", self.rpc_host, self.rpc_port)
    }

    /// The certificate file; a directory is treated as lnd directory holding `tls.cert`
    pub fn tls_cert_file(&self) -> PathBuf {
        if self.tls_cert_path.is_dir() {
            self.tls_cert_path.join(TLS_CERT_FILE)
        } else {
            self.tls_cert_path.clone()
        }
    }

    fn lnd_dir(&self) -> PathBuf {
        if self.tls_cert_path.is_dir() {
            return self.tls_cert_path.clone();
        }
        self.tls_cert_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default()
    }

    pub fn macaroon_file(&self) -> PathBuf {
        let dir = match &self.macaroon_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => self
                .lnd_dir()
                .join("data")
                .join("chain")
                .join("bitcoin")
                .join(self.network.to_string()),
        };
        dir.join(MACAROON_FILE)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // Explicit values for every flag, so variables set in the test
    // environment cannot leak into the parsed config
    const BASELINE: [(&str, &str); 8] = [
        ("--rpc-host", "localhost"),
        ("--rpc-port", "10009"),
        ("--tls-cert-path", "/root/.lnd"),
        ("--network", "mainnet"),
        ("--bucket-url", "file:///tmp/backups"),
        ("--upload-retries", "0"),
        ("--retry-delay-ms", "1000"),
        ("--shutdown-timeout-secs", "30"),
    ];

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["lnd-backup"];
        for (flag, value) in BASELINE {
            if !args.contains(&flag) {
                argv.extend([flag, value]);
            }
        }
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    // MACAROON_DIR has no flag value meaning "unset", so derivation is
    // checked on a config built directly
    fn without_macaroon_dir(tls_cert_path: impl Into<PathBuf>, network: Network) -> Config {
        Config {
            macaroon_dir: None,
            tls_cert_path: tls_cert_path.into(),
            network,
            ..parse(&[])
        }
    }

    fn default_of(flag: &str) -> String {
        Config::command()
            .get_arguments()
            .find(|arg| arg.get_long() == Some(flag))
            .and_then(|arg| arg.get_default_values().first())
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    #[test]
    fn documented_defaults() {
        assert_eq!(default_of("rpc-host"), "localhost");
        assert_eq!(default_of("rpc-port"), "10009");
        assert_eq!(default_of("tls-cert-path"), "/root/.lnd");
        assert_eq!(default_of("network"), "mainnet");
        assert_eq!(default_of("upload-retries"), "0");
        assert_eq!(default_of("retry-delay-ms"), "1000");
        assert_eq!(default_of("shutdown-timeout-secs"), "30");
        assert_eq!(default_of("macaroon-dir"), "");
        assert_eq!(default_of("bucket-url"), "");
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--rpc-host",
            "node.internal",
            "--rpc-port",
            "10010",
            "--network",
            "testnet",
            "--bucket-url",
            "gs://bucket/path",
        ]);

        assert_eq!(config.rpc_address(), "https://node.internal:10010");
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.bucket_url, "gs://bucket/path");
        config.validate().unwrap();
    }

    #[test]
    fn macaroon_dir_derived_from_network() {
        let config = without_macaroon_dir("/nonexistent/lnd/tls.cert", Network::Regtest);

        assert_eq!(
            config.macaroon_file(),
            PathBuf::from("/nonexistent/lnd/data/chain/bitcoin/regtest/admin.macaroon")
        );
        assert_eq!(
            config.tls_cert_file(),
            PathBuf::from("/nonexistent/lnd/tls.cert")
        );
    }

    #[test]
    fn explicit_macaroon_dir_wins() {
        let config = parse(&["--macaroon-dir", "/secrets"]);
        assert_eq!(
            config.macaroon_file(),
            PathBuf::from("/secrets/admin.macaroon")
        );
    }

    #[test]
    fn tls_directory_points_to_cert_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = without_macaroon_dir(dir.path(), Network::Mainnet);

        assert_eq!(config.tls_cert_file(), dir.path().join(TLS_CERT_FILE));
        assert_eq!(
            config.macaroon_file(),
            dir.path()
                .join("data/chain/bitcoin/mainnet")
                .join(MACAROON_FILE)
        );
    }

    #[test]
    fn unknown_network_is_rejected() {
        let result = Config::try_parse_from([
            "lnd-backup",
            "--bucket-url",
            "file:///tmp/backups",
            "--network",
            "litecoin",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unsupported_bucket_provider_fails_validation() {
        let config = parse(&["--bucket-url", "azblob://container/path"]);
        assert!(matches!(
            config.validate(),
            Err(BackupError::UnsupportedProvider(_))
        ));
    }

    #[test]
    fn empty_rpc_host_fails_validation() {
        let config = parse(&["--rpc-host", " "]);
        assert!(matches!(config.validate(), Err(BackupError::Config(_))));
    }

    #[test]
    fn durations() {
        let config = parse(&["--retry-delay-ms", "250", "--shutdown-timeout-secs", "5"]);
        assert_eq!(config.retry_delay(), Duration::from_millis(250));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
    }
}
