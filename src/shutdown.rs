use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Set while a backup upload is running
pub type InFlight = Arc<AtomicBool>;

pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once a stop was requested. Never resolves if the trigger
    /// is dropped without firing.
    pub async fn triggered(&mut self) {
        if self.rx.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await
        }
    }
}

/// Logs the shutdown and tells the event loop to stop
pub fn request_shutdown(trigger: &ShutdownTrigger, in_flight: &InFlight) {
    if in_flight.load(Ordering::SeqCst) {
        info!("Waiting for pending backups");
    }
    info!("Shutting Down Gracefully");
    trigger.trigger();
}

/// Spawns the listener for SIGINT and SIGTERM
pub fn spawn_signal_listener(trigger: ShutdownTrigger, in_flight: InFlight) -> JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => request_shutdown(&trigger, &in_flight),
            Err(e) => {
                tracing::error!(error = ?e, "cannot listen for termination signals");
            }
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = terminate.recv() => tracing::debug!("received SIGTERM"),
        _ = interrupt.recv() => tracing::debug!("received SIGINT"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
