//! Signal handling for graceful player shutdown.

use tokio::signal;
use tracing::info;

/// Waits until the process is asked to terminate.
///
/// Listens for SIGINT and SIGTERM on Unix and for Ctrl+C elsewhere.
pub async fn wait_for_shutdown_signal() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await?;

    info!("📡 Received shutdown signal - stopping plugins");
    Ok(())
}
