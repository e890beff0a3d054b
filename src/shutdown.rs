//! Graceful shutdown trigger, wired into `axum::serve(..).with_graceful_shutdown(..)`.
//!
//! Plays the same role `CancellationToken`s play throughout the rest of this
//! crate: a future that resolves once, signaling every in-flight task to
//! wind down.

use log::info;

pub async fn signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
