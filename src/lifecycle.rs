//! Peer lifecycle: the single teardown path shared by socket close, the
//! `disconnect` message, keepalive eviction, and stale-connection eviction on
//! rejoin — so "cancel timer, leave room, broadcast peer-left, close
//! transport" is written exactly once.

use std::sync::Arc;

use log::debug;

use crate::peer::Peer;
use crate::protocol::ServerMessage;
use crate::registry::Registry;

/// Tear down `peer`: cancel its keepalive, remove it from its room, and
/// broadcast `peer-left` to whoever remains. The peer's transport is closed
/// implicitly once its `Outbox` sender side and writer task are dropped by
/// the caller.
///
/// A no-op beyond the cancel if `peer` was already displaced by a reconnect
/// (see `Registry::leave`) — the stale connection's own teardown must not
/// evict the identity's current occupant out from under it.
pub fn teardown(peer: &Arc<Peer>, registry: &Registry) {
    peer.cancel.cancel();
    let Some(remaining) = registry.leave(peer) else {
        debug!("peer {} teardown: already superseded by a reconnect", peer.id);
        return;
    };
    debug!(
        "peer {} left room {} ({} remaining)",
        peer.id,
        peer.room_key,
        remaining.len()
    );
    for other in remaining {
        other.send(ServerMessage::PeerLeft {
            peer_id: peer.id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::device::parse_user_agent;
    use crate::protocol::OutboundFrame;
    use tokio::sync::mpsc;

    fn make_peer(id: &str, room: &str) -> (Arc<Peer>, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let peer = Arc::new(Peer::new(
            id.to_string(),
            room.to_string(),
            tx,
            parse_user_agent(""),
            "Red Wolf".to_string(),
        ));
        (peer, rx)
    }

    #[test]
    fn teardown_cancels_keepalive_and_notifies_remaining_peers() {
        let registry = Registry::new();
        let (a, _rx_a) = make_peer("a", "room1");
        let (b, mut rx_b) = make_peer("b", "room1");
        registry.join(a.clone());
        registry.join(b);

        teardown(&a, &registry);

        assert!(a.cancel.is_cancelled());
        let msg = rx_b.try_recv().unwrap();
        assert!(matches!(
            msg,
            OutboundFrame::Typed(ServerMessage::PeerLeft { peer_id }) if peer_id == "a"
        ));
        assert_eq!(registry.peer_count("room1"), 1);
    }

    #[test]
    fn teardown_of_last_peer_removes_the_room() {
        let registry = Registry::new();
        let (a, _rx_a) = make_peer("a", "room1");
        registry.join(a.clone());

        teardown(&a, &registry);
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn teardown_of_a_superseded_connection_does_not_evict_the_reconnected_peer() {
        let registry = Registry::new();
        let (a_old, _rx_old) = make_peer("a", "room1");
        let (a_new, mut rx_new) = make_peer("a", "room1");
        registry.join(a_old.clone());
        registry.join(a_new.clone());

        teardown(&a_old, &registry);

        assert!(a_old.cancel.is_cancelled());
        assert_eq!(registry.peer_count("room1"), 1);
        assert!(registry.find("room1", "a").is_some());
        assert!(rx_new.try_recv().is_err());
    }
}
