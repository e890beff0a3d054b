//! Peer identity: minting, cookie continuity, and derived display names.

pub mod device;
pub mod naming;

use uuid::Uuid;

const COOKIE_NAME: &str = "peerid";

/// Mint a fresh peer identifier. The spec's 8-4-4-4-12 hex grouping with a
/// version-4 nibble and an RFC-4122 variant is, byte for byte, a standard
/// UUID v4 — so this is exactly `Uuid::new_v4()`.
pub fn generate_peer_id() -> String {
    Uuid::new_v4().to_string()
}

/// Extract a previously-issued peer id from a raw `Cookie` header value, if
/// present and well-formed. Malformed or absent cookies yield `None`, in
/// which case the caller mints a fresh identity.
pub fn peer_id_from_cookie(cookie_header: Option<&str>) -> Option<String> {
    let header = cookie_header?;
    for pair in header.split(';') {
        let pair = pair.trim();
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        if name.trim() == COOKIE_NAME {
            let value = value.trim();
            return Uuid::parse_str(value).ok().map(|u| u.to_string());
        }
    }
    None
}

/// `Set-Cookie` header value for persisting a freshly minted identity.
pub fn set_cookie_header(peer_id: &str) -> String {
    format!("{COOKIE_NAME}={peer_id}; SameSite=Strict; Secure")
}
