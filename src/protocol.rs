//! Wire envelope types.
//!
//! Outbound frames are modeled as a tagged enum serialized straight to JSON
//! text. Inbound frames are deliberately *not* modeled as a closed enum: the
//! router only ever looks at `type`, `to`, and `name.deviceType`, and must
//! forward everything else byte-for-byte, so inbound frames stay as
//! `serde_json::Value` all the way through (see `router.rs`).

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct NameInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(rename = "deviceName")]
    pub device_name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeerInfoRecord {
    pub id: String,
    pub name: NameInfo,
    #[serde(rename = "rtcSupported")]
    pub rtc_supported: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayNameMessage {
    #[serde(rename = "peerId")]
    pub peer_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "deviceName")]
    pub device_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "display-name")]
    DisplayName { message: DisplayNameMessage },
    #[serde(rename = "peers")]
    Peers { peers: Vec<PeerInfoRecord> },
    #[serde(rename = "peer-joined")]
    PeerJoined { peer: PeerInfoRecord },
    #[serde(rename = "peer-left")]
    PeerLeft {
        #[serde(rename = "peerId")]
        peer_id: String,
    },
    #[serde(rename = "peer-updated")]
    PeerUpdated { peer: PeerInfoRecord },
    #[serde(rename = "ping")]
    Ping,
}

impl ServerMessage {
    /// Serialize to the text frame sent over the wire. Construction from
    /// well-formed Rust values is infallible.
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).expect("server message serialization is infallible")
    }
}

/// Anything enqueued on a peer's [`crate::peer::Outbox`]: either one of the
/// structured frame types above, or an already-built relay envelope that the
/// router forwards byte-for-byte (minus `to`, plus `sender`). Kept as a
/// separate type rather than folded into `ServerMessage` because a relay
/// payload is arbitrary client-originated JSON that must not be forced
/// through the closed, internally-tagged `type` enum.
#[derive(Debug, Clone)]
pub enum OutboundFrame {
    Typed(ServerMessage),
    Relay(serde_json::Value),
}

impl OutboundFrame {
    pub fn to_text(&self) -> String {
        match self {
            OutboundFrame::Typed(message) => message.to_text(),
            OutboundFrame::Relay(value) => value.to_string(),
        }
    }
}

impl From<ServerMessage> for OutboundFrame {
    fn from(message: ServerMessage) -> Self {
        OutboundFrame::Typed(message)
    }
}
