//! Room key derivation: which peers are grouped together.
//!
//! The room key is the client's externally observed network address. This
//! conflates "same public network" with "same room" and is ambiguous behind
//! a shared proxy — that ambiguity is preserved deliberately, not resolved
//! here.

/// Derive a room key from an optional `X-Forwarded-For` header value and the
/// transport-level remote address, normalizing IPv6 loopback forms to
/// `127.0.0.1` so that `::1` and `127.0.0.1` land in the same room.
pub fn derive(forwarded_for: Option<&str>, remote_addr: &str) -> String {
    let raw = match forwarded_for {
        Some(header) => header.split(',').next().unwrap_or(remote_addr).trim(),
        None => remote_addr,
    };
    normalize_loopback(raw)
}

fn normalize_loopback(addr: &str) -> String {
    match addr {
        "::1" | "::ffff:127.0.0.1" => "127.0.0.1".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_remote_addr_without_forwarded_header() {
        assert_eq!(derive(None, "192.168.1.5"), "192.168.1.5");
    }

    #[test]
    fn prefers_first_token_of_forwarded_for() {
        assert_eq!(derive(Some(" 203.0.113.9 , 10.0.0.1"), "10.0.0.1"), "203.0.113.9");
    }

    #[test]
    fn normalizes_ipv6_loopback_forms() {
        assert_eq!(derive(None, "::1"), "127.0.0.1");
        assert_eq!(derive(None, "::ffff:127.0.0.1"), "127.0.0.1");
    }

    #[test]
    fn loopback_and_v4_loopback_share_a_room_key() {
        assert_eq!(derive(None, "::1"), derive(None, "127.0.0.1"));
    }
}
