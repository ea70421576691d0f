use tokio::signal;
use tracing::warn;

/// Resolves on Ctrl+C or, on unix, SIGTERM.
///
/// In-flight generation requests are dropped with the server, which also
/// removes their uploads.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("🛑 Ctrl+C received, stopping video generation server..."),
        _ = terminate => warn!("🛑 SIGTERM received, stopping video generation server..."),
    }
}
