//! `Peer`: the state held for one live connection.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::identity::device::DeviceDescriptor;
use crate::protocol::{NameInfo, OutboundFrame, PeerInfoRecord};

/// Outbound channel for one peer. Enqueuing onto this channel is what
/// "sending" to a peer means throughout this crate — a dedicated writer task
/// per connection drains it onto the live socket, decoupling registry
/// fan-out from fallible socket I/O.
pub type Outbox = mpsc::UnboundedSender<OutboundFrame>;

struct NameState {
    descriptor: DeviceDescriptor,
    display_name: String,
}

pub struct Peer {
    pub id: String,
    pub room_key: String,
    sender: Outbox,
    name: Mutex<NameState>,
    last_heartbeat_unix_ms: AtomicI64,
    /// Cancelled when this connection is torn down — by socket close, the
    /// `disconnect` message, keepalive eviction, or a reconnect displacing
    /// this peer. Both the keepalive loop and the connection's own
    /// read/write tasks select on it, so cancelling it is what actually
    /// ends the connection.
    pub cancel: CancellationToken,
}

impl Peer {
    pub fn new(
        id: String,
        room_key: String,
        sender: Outbox,
        descriptor: DeviceDescriptor,
        display_name: String,
    ) -> Self {
        Peer {
            id,
            room_key,
            sender,
            name: Mutex::new(NameState {
                descriptor,
                display_name,
            }),
            last_heartbeat_unix_ms: AtomicI64::new(now_millis()),
            cancel: CancellationToken::new(),
        }
    }

    /// Enqueue a frame for delivery. Silently dropped if the peer's writer
    /// task (and therefore its socket) has already gone away — a send
    /// failure to one peer must never abort fan-out to the rest of a room.
    pub fn send(&self, message: impl Into<OutboundFrame>) {
        let _ = self.sender.send(message.into());
    }

    pub fn touch_heartbeat(&self) {
        self.last_heartbeat_unix_ms.store(now_millis(), Ordering::Relaxed);
    }

    pub fn millis_since_heartbeat(&self) -> i64 {
        now_millis() - self.last_heartbeat_unix_ms.load(Ordering::Relaxed)
    }

    /// Record the device type carried by an `introduce` frame. Everything
    /// else about the descriptor (os, browser, model) was fixed at join time
    /// from the user agent and is never revised.
    pub fn set_device_type(&self, device_type: String) {
        self.name.lock().descriptor.device_type = Some(device_type);
    }

    pub fn info_record(&self) -> PeerInfoRecord {
        let name = self.name.lock();
        PeerInfoRecord {
            id: self.id.clone(),
            name: NameInfo {
                model: name.descriptor.device_model.clone(),
                os: name.descriptor.os_name.clone(),
                browser: name.descriptor.browser_name.clone(),
                device_type: name.descriptor.device_type_or_default(),
                device_name: name.descriptor.device_name(),
                display_name: name.display_name.clone(),
            },
            rtc_supported: true,
        }
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
