//! Transport Frontend: HTTP static serving plus the WebSocket upgrade.
//!
//! Channel-decoupled sends, `CancellationToken`-gated tasks, and `log`-based
//! tracing of connection events follow the same idiom as the rest of this
//! crate; see `DESIGN.md` for where the `axum` router shape itself comes
//! from.

pub mod handshake;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tower_http::services::ServeDir;

use crate::identity::device::DeviceDescriptor;
use crate::keepalive;
use crate::lifecycle;
use crate::peer::Peer;
use crate::protocol::{DisplayNameMessage, ServerMessage};
use crate::registry::Registry;
use crate::router;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
}

pub fn build_router(state: AppState, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: axum::http::HeaderMap,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    let hs = handshake::derive(&headers, remote_addr);
    let set_cookie = hs
        .is_fresh_identity
        .then(|| crate::identity::set_cookie_header(&hs.peer_id));

    let registry = state.registry.clone();
    let peer_id = hs.peer_id.clone();
    let mut response = ws
        .on_upgrade(move |socket| {
            handle_socket(
                socket,
                peer_id,
                hs.room_key,
                hs.descriptor,
                hs.display_name,
                registry,
            )
        })
        .into_response();

    if let Some(cookie) = set_cookie {
        response.headers_mut().insert(
            axum::http::header::SET_COOKIE,
            HeaderValue::from_str(&cookie).expect("cookie value is always a valid header value"),
        );
    }
    response
}

async fn handle_socket(
    socket: WebSocket,
    peer_id: String,
    room_key: String,
    descriptor: DeviceDescriptor,
    display_name: String,
    registry: Arc<Registry>,
) {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let peer = Arc::new(Peer::new(
        peer_id,
        room_key,
        tx,
        descriptor,
        display_name.clone(),
    ));

    let (mut ws_tx, mut ws_rx) = socket.split();

    let writer_cancel = peer.cancel.clone();
    let writer_peer_id = peer.id.clone();
    let writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = writer_cancel.cancelled() => break,
                frame = rx.recv() => {
                    match frame {
                        Some(frame) => {
                            if let Err(err) = ws_tx.send(Message::Text(frame.to_text())).await {
                                warn!("peer {writer_peer_id} send failed, closing: {err}");
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        }
        let _ = ws_tx.close().await;
    });

    let (existing, evicted) = registry.join(peer.clone());
    if let Some(stale) = evicted {
        info!("peer {} reconnected, evicting stale connection", peer.id);
        stale.cancel.cancel();
        registry.broadcast_except(
            &peer.room_key,
            &peer.id,
            ServerMessage::PeerLeft {
                peer_id: stale.id.clone(),
            },
        );
    }

    peer.send(ServerMessage::DisplayName {
        message: DisplayNameMessage {
            peer_id: peer.id.clone(),
            display_name,
            device_name: peer.info_record().name.device_name,
        },
    });
    peer.send(ServerMessage::Peers {
        peers: existing.iter().map(|p| p.info_record()).collect(),
    });
    registry.broadcast_except(
        &peer.room_key,
        &peer.id,
        ServerMessage::PeerJoined {
            peer: peer.info_record(),
        },
    );

    keepalive::spawn(peer.clone(), registry.clone());
    info!("peer {} joined room {}", peer.id, peer.room_key);

    loop {
        tokio::select! {
            _ = peer.cancel.cancelled() => break,
            message = ws_rx.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => router::handle_frame(&text, &peer, &registry),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!("peer {} socket error: {err}", peer.id);
                        break;
                    }
                }
            }
        }
    }

    lifecycle::teardown(&peer, &registry);
    debug!("peer {} connection closed", peer.id);
    let _ = writer.await;
}

pub async fn static_dir_healthcheck(path: &std::path::Path) -> Result<(), std::io::Error> {
    tokio::fs::metadata(path).await.map(|_| ())
}
