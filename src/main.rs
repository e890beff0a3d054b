//! roomwire: signaling and presence server for local-network peer-to-peer
//! transfer. Owns discovery (rooms keyed by network address), identity,
//! presence fan-out, and opaque message relay; the actual file/data transfer
//! happens directly between clients once this server has introduced them.

mod config;
mod error;
mod identity;
mod keepalive;
mod lifecycle;
mod logging;
mod net;
mod peer;
mod protocol;
mod registry;
mod room_key;
mod router;
mod shutdown;

use std::net::SocketAddr;
use std::sync::Arc;

use config::Config;
use error::ServerError;
use registry::Registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    logging::setup_logger(&config)?;

    net::static_dir_healthcheck(&config.static_dir)
        .await
        .map_err(|e| ServerError::StaticDirUnreadable(config.static_dir.clone(), e))?;

    let state = net::AppState {
        registry: Arc::new(Registry::new()),
    };
    let app = net::build_router(state, config.static_dir.clone());

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| ServerError::BindFailed(bind_addr.clone(), e))?;

    log::info!("roomwire listening on {bind_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown::signal())
    .await?;

    log::info!("roomwire shut down cleanly");
    Ok(())
}
