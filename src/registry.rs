//! The Room Registry: the sole shared mutable structure in the server.
//!
//! One lock guards the whole room map, rather than a lock-free map: every
//! mutation or snapshot read is a short critical section that never performs
//! I/O. Fan-out always happens after the lock is released, against a cloned
//! snapshot of `Arc<Peer>` handles.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::peer::Peer;
use crate::protocol::ServerMessage;

type Room = HashMap<String, Arc<Peer>>;

pub struct Registry {
    rooms: RwLock<HashMap<String, Room>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Register `peer` in its room. Returns the peers that were already in
    /// the room (for the join-time `peers` snapshot) and, if a connection
    /// with the same identity was already registered there, the stale peer
    /// that was displaced — the caller is responsible for tearing that one
    /// down (cancel its keepalive, close its transport, broadcast
    /// `peer-left` for it) before the new peer's own join frames go out.
    pub fn join(&self, peer: Arc<Peer>) -> (Vec<Arc<Peer>>, Option<Arc<Peer>>) {
        let mut rooms = self.rooms.write();
        let room = rooms.entry(peer.room_key.clone()).or_default();
        let evicted = room.remove(&peer.id);
        let existing: Vec<Arc<Peer>> = room.values().cloned().collect();
        room.insert(peer.id.clone(), peer);
        (existing, evicted)
    }

    /// Remove `peer` from its room, but only if it is still the occupant
    /// registered under its id — compared by `Arc` identity, not by id
    /// string. A reconnect replaces the room entry for an id without
    /// removing the displaced connection's own `Peer` handle, so when that
    /// stale connection's reader loop eventually unwinds and calls this
    /// itself, a plain id lookup would delete the *new* connection's entry.
    /// Returns `None` when `peer` was already superseded (nothing to
    /// broadcast); otherwise `Some(remaining)` with the peers left in the
    /// room. Deletes the room entry entirely once it is empty.
    pub fn leave(&self, peer: &Arc<Peer>) -> Option<Vec<Arc<Peer>>> {
        let mut rooms = self.rooms.write();
        let room = rooms.get_mut(&peer.room_key)?;
        let is_current = room.get(&peer.id).map_or(false, |p| Arc::ptr_eq(p, peer));
        if !is_current {
            return None;
        }
        room.remove(&peer.id);
        let remaining: Vec<Arc<Peer>> = room.values().cloned().collect();
        if room.is_empty() {
            rooms.remove(&peer.room_key);
        }
        Some(remaining)
    }

    /// Find a peer by identity, scoped to a single room — the router must
    /// never resolve a `to` target across room boundaries.
    pub fn find(&self, room_key: &str, peer_id: &str) -> Option<Arc<Peer>> {
        self.rooms.read().get(room_key)?.get(peer_id).cloned()
    }

    /// Snapshot of every other peer currently in `room_key`.
    pub fn peers_except(&self, room_key: &str, exclude_id: &str) -> Vec<Arc<Peer>> {
        match self.rooms.read().get(room_key) {
            Some(room) => room
                .values()
                .filter(|p| p.id != exclude_id)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Send `message` to every other peer in `room_key`. The snapshot is
    /// taken under the lock; the sends themselves happen after it is
    /// released, so a slow or dead peer cannot block the broadcast and a
    /// peer departing mid-broadcast is simply absent from the snapshot.
    pub fn broadcast_except(&self, room_key: &str, exclude_id: &str, message: ServerMessage) {
        for peer in self.peers_except(room_key, exclude_id) {
            peer.send(message.clone());
        }
    }

    #[cfg(test)]
    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }

    #[cfg(test)]
    pub fn peer_count(&self, room_key: &str) -> usize {
        self.rooms.read().get(room_key).map(|r| r.len()).unwrap_or(0)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
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
    fn join_snapshot_excludes_the_joining_peer_and_includes_prior_members() {
        let registry = Registry::new();
        let (a, _rx_a) = make_peer("a", "room1");
        let (b, _rx_b) = make_peer("b", "room1");

        let (existing_for_a, evicted) = registry.join(a.clone());
        assert!(existing_for_a.is_empty());
        assert!(evicted.is_none());

        let (existing_for_b, evicted) = registry.join(b.clone());
        assert_eq!(existing_for_b.len(), 1);
        assert_eq!(existing_for_b[0].id, "a");
        assert!(evicted.is_none());
    }

    #[test]
    fn rooms_are_isolated() {
        let registry = Registry::new();
        let (a, _rx_a) = make_peer("a", "room1");
        let (b, _rx_b) = make_peer("b", "room2");
        registry.join(a);
        registry.join(b);

        assert!(registry.find("room1", "b").is_none());
        assert!(registry.find("room2", "a").is_none());
        assert_eq!(registry.peer_count("room1"), 1);
        assert_eq!(registry.peer_count("room2"), 1);
    }

    #[test]
    fn leave_empties_and_removes_the_room() {
        let registry = Registry::new();
        let (a, _rx_a) = make_peer("a", "room1");
        registry.join(a.clone());
        assert_eq!(registry.room_count(), 1);

        let remaining = registry.leave(&a).expect("a is still the current occupant");
        assert!(remaining.is_empty());
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn leave_broadcasts_to_remaining_members_only() {
        let registry = Registry::new();
        let (a, _rx_a) = make_peer("a", "room1");
        let (b, mut rx_b) = make_peer("b", "room1");
        registry.join(a.clone());
        registry.join(b);

        let remaining = registry.leave(&a).expect("a is still the current occupant");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "b");

        registry.broadcast_except("room1", "a", ServerMessage::PeerLeft { peer_id: "a".into() });
        let msg = rx_b.try_recv().expect("b should have received peer-left");
        match msg {
            OutboundFrame::Typed(ServerMessage::PeerLeft { peer_id }) => assert_eq!(peer_id, "a"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn rejoining_with_the_same_identity_evicts_the_stale_connection() {
        let registry = Registry::new();
        let (a1, _rx1) = make_peer("a", "room1");
        let (a2, _rx2) = make_peer("a", "room1");
        registry.join(a1);
        let (_existing, evicted) = registry.join(a2);
        assert!(evicted.is_some());
        assert_eq!(evicted.unwrap().id, "a");
        assert_eq!(registry.peer_count("room1"), 1);
    }

    #[test]
    fn leave_on_a_superseded_peer_does_not_touch_the_new_occupant() {
        let registry = Registry::new();
        let (a1, _rx1) = make_peer("a", "room1");
        let (a2, _rx2) = make_peer("a", "room1");
        registry.join(a1.clone());
        registry.join(a2);

        assert!(registry.leave(&a1).is_none());
        assert_eq!(registry.peer_count("room1"), 1);
        assert!(registry.find("room1", "a").is_some());
    }
}
