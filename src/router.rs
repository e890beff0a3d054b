//! Message Router: dispatches inbound frames by `type`.
//!
//! Never inspects a payload beyond `type`, `to`, and `name.deviceType` —
//! everything else in a relayed frame passes through untouched. Malformed
//! frames and unrecognized types are dropped silently; the connection stays
//! open either way.

use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::lifecycle;
use crate::peer::Peer;
use crate::protocol::{OutboundFrame, ServerMessage};
use crate::registry::Registry;

pub fn handle_frame(text: &str, peer: &Arc<Peer>, registry: &Registry) {
    let mut envelope: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            debug!("peer {} sent an unparseable frame, dropping", peer.id);
            return;
        }
    };

    let frame_type = match envelope.get("type").and_then(Value::as_str) {
        Some(t) => t.to_string(),
        None => {
            debug!("peer {} sent a frame with no type field, dropping", peer.id);
            return;
        }
    };

    match frame_type.as_str() {
        "introduce" => handle_introduce(&envelope, peer, registry),
        "disconnect" => lifecycle::teardown(peer, registry),
        "pong" => peer.touch_heartbeat(),
        _ => {
            if envelope.get("to").and_then(Value::as_str).is_some() {
                handle_relay(&mut envelope, peer, registry);
            }
        }
    }
}

fn handle_introduce(envelope: &Value, peer: &Arc<Peer>, registry: &Registry) {
    if let Some(device_type) = envelope.pointer("/name/deviceType").and_then(Value::as_str) {
        peer.set_device_type(device_type.to_string());
    }

    registry.broadcast_except(
        &peer.room_key,
        &peer.id,
        ServerMessage::PeerUpdated {
            peer: peer.info_record(),
        },
    );

    let others = registry.peers_except(&peer.room_key, &peer.id);
    peer.send(ServerMessage::Peers {
        peers: others.iter().map(|p| p.info_record()).collect(),
    });
}

fn handle_relay(envelope: &mut Value, peer: &Arc<Peer>, registry: &Registry) {
    let Some(to) = envelope.get("to").and_then(Value::as_str).map(str::to_string) else {
        return;
    };

    let Some(target) = registry.find(&peer.room_key, &to) else {
        debug!("peer {} tried to relay to unknown peer {}", peer.id, to);
        return;
    };

    if let Some(object) = envelope.as_object_mut() {
        object.remove("to");
        object.insert("sender".to_string(), Value::String(peer.id.clone()));
    }

    target.send(OutboundFrame::Relay(envelope.clone()));
}
