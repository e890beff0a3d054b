//! Per-peer keepalive supervisor.
//!
//! Scheduled as its own task per peer, independent of the frame-reading
//! task, so a peer slow to read never delays its own liveness check and a
//! wedged keepalive task can never starve frame delivery.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::interval;

use crate::lifecycle;
use crate::peer::Peer;
use crate::protocol::ServerMessage;
use crate::registry::Registry;

pub const PING_INTERVAL: Duration = Duration::from_secs(30);
pub const DEAD_AFTER: Duration = Duration::from_secs(60);

/// Spawn the keepalive loop for `peer`. Runs until `peer.cancel` is
/// cancelled by some other teardown path, or until this loop itself decides
/// the peer is dead and tears it down.
pub fn spawn(peer: Arc<Peer>, registry: Arc<Registry>) {
    tokio::spawn(async move {
        let mut ticker = interval(PING_INTERVAL);
        ticker.tick().await; // the first tick fires immediately; the first real check waits a full interval

        loop {
            tokio::select! {
                _ = peer.cancel.cancelled() => {
                    debug!("keepalive loop for {} stopped", peer.id);
                    return;
                }
                _ = ticker.tick() => {
                    if peer.millis_since_heartbeat() as u64 >= DEAD_AFTER.as_millis() as u64 {
                        warn!("peer {} missed keepalive deadline, evicting", peer.id);
                        lifecycle::teardown(&peer, &registry);
                        return;
                    }
                    peer.send(ServerMessage::Ping);
                }
            }
        }
    });
}
