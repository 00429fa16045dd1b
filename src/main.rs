use anyhow::Result;
use clap::Parser;
use lnd_backup::{
    config::Config,
    lnd_client::LndClient,
    runner::EventLoop,
    shutdown::{shutdown_channel, spawn_signal_listener, InFlight},
    uploader::Uploader,
};
use rustls::crypto::CryptoProvider;
use std::backtrace::Backtrace;
use std::panic;
use std::sync::{atomic::AtomicBool, Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    panic::set_hook(Box::new(|info| {
        let stacktrace = Backtrace::force_capture();
        println!("Got panic. @info:{}\n@stackTrace:{}", info, stacktrace);
        std::process::abort();
    }));

    dotenvy::from_filename(".env").ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or("none".into())
        .add_directive("lnd_backup=info".parse()?);

    let subscriber = tracing_subscriber::fmt()
        // Use a more compact, abbreviated log format
        .compact()
        .with_env_filter(filter)
        // Display source code file paths
        .with_file(true)
        // Display source code line numbers
        .with_line_number(true)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // ring and aws-lc-rs are both linked, rustls cannot choose on its own
    if CryptoProvider::install_default(rustls::crypto::ring::default_provider()).is_err() {
        warn!("a rustls crypto provider was already installed");
    }

    let config = Config::parse();
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_commit = option_env!("GIT_COMMIT").unwrap_or("unknown"),
        "Starting Lightning Static Channel Backup"
    );

    let (trigger, mut signal) = shutdown_channel();
    let in_flight: InFlight = Arc::new(AtomicBool::new(false));
    let listener = spawn_signal_listener(trigger, in_flight.clone());

    let client = tokio::select! {
        client = LndClient::connect(&config) => client.map_err(|e| {
            error!("cannot connect to lightning services: {}", e);
            e
        })?,
        _ = signal.triggered() => return Ok(()),
    };

    let uploader = Uploader::new(config.bucket_url.clone())
        .with_retries(config.upload_retries, config.retry_delay());

    let summary = EventLoop::new(client, uploader, signal)
        .with_in_flight(in_flight)
        .with_shutdown_timeout(config.shutdown_timeout())
        .run()
        .await?;

    listener.abort();
    if summary.failed > 0 || summary.abandoned > 0 {
        error!(
            failed = summary.failed,
            abandoned = summary.abandoned,
            "some channel backups were not stored"
        );
    }
    Ok(())
}
