//! Derive a connection's identity, room, and device descriptor from the
//! upgrade request, before any `Peer` is constructed.

use std::net::SocketAddr;

use axum::http::HeaderMap;

use crate::identity::device::{self, DeviceDescriptor};
use crate::identity::{self, naming};
use crate::room_key;

pub struct Handshake {
    pub peer_id: String,
    /// `true` when no valid `peerid` cookie was presented and a fresh
    /// identity was minted — the caller must attach `Set-Cookie`.
    pub is_fresh_identity: bool,
    pub room_key: String,
    pub descriptor: DeviceDescriptor,
    pub display_name: String,
}

pub fn derive(headers: &HeaderMap, remote_addr: SocketAddr) -> Handshake {
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    let room_key = room_key::derive(forwarded_for, &remote_addr.ip().to_string());

    let cookie_header = headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok());
    let (peer_id, is_fresh_identity) = match identity::peer_id_from_cookie(cookie_header) {
        Some(id) => (id, false),
        None => (identity::generate_peer_id(), true),
    };

    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let descriptor = device::parse_user_agent(user_agent);
    let display_name = naming::display_name(&peer_id);

    Handshake {
        peer_id,
        is_fresh_identity,
        room_key,
        descriptor,
        display_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn remote() -> SocketAddr {
        "10.0.0.5:4000".parse().unwrap()
    }

    #[test]
    fn no_cookie_mints_a_fresh_identity() {
        let headers = HeaderMap::new();
        let hs = derive(&headers, remote());
        assert!(hs.is_fresh_identity);
        assert_eq!(hs.room_key, "10.0.0.5");
    }

    #[test]
    fn valid_cookie_reuses_the_presented_identity() {
        let id = identity::generate_peer_id();
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_str(&format!("peerid={id}")).unwrap(),
        );
        let hs = derive(&headers, remote());
        assert!(!hs.is_fresh_identity);
        assert_eq!(hs.peer_id, id);
    }

    #[test]
    fn forwarded_for_header_overrides_the_socket_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        let hs = derive(&headers, remote());
        assert_eq!(hs.room_key, "203.0.113.9");
    }

    #[test]
    fn display_name_is_deterministic_in_the_peer_id() {
        let id = identity::generate_peer_id();
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_str(&format!("peerid={id}")).unwrap(),
        );
        let first = derive(&headers, remote());
        let second = derive(&headers, remote());
        assert_eq!(first.display_name, second.display_name);
    }
}
