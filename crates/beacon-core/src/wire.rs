//! Beacon wire format — the hello datagram heard by every node on the link.
//!
//! The datagram is #[repr(C, packed)] for deterministic layout and uses
//! zerocopy derives for safe, allocation-free serialization. There is no
//! unsafe code in this module.

use core::fmt;

use static_assertions::assert_eq_size;
use zerocopy::{AsBytes, FromBytes, FromZeroes};

// ── Node Identity ────────────────────────────────────────────────────────────

/// Two-byte node identifier, printed as `x.y`.
///
/// Small enough to ride in every datagram and to read off a log line at a
/// glance. Uniqueness on the link is the operator's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsBytes, FromBytes, FromZeroes)]
#[repr(transparent)]
pub struct NodeId(pub [u8; 2]);

impl NodeId {
    pub fn from_u16(id: u16) -> Self {
        Self(id.to_be_bytes())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0[0], self.0[1])
    }
}

// ── Hello Datagram ───────────────────────────────────────────────────────────

/// Broadcast via ff02::1 multicast to announce presence.
///
/// Receivers feed `(node_id, rssi)` into their neighbor table; the greeting
/// is logged and otherwise ignored. UDP exposes no receive-side signal
/// measurement, so the link metric is reported by the sender.
///
/// Wire size: 32 bytes.
#[derive(Debug, Clone, AsBytes, FromBytes, FromZeroes)]
#[repr(C, packed)]
pub struct HelloDatagram {
    /// Sender's node id.
    pub node_id: NodeId,

    /// Wire format version. Currently 0x01.
    /// A receiver seeing an unknown version silently drops the datagram.
    pub version: u8,

    /// Bit flags. Reserved, must be zero.
    pub flags: u8,

    /// Sender-reported link metric. Higher is stronger.
    pub rssi: i16,

    /// Length of the greeting in `msg`, at most MAX_MESSAGE.
    pub msg_len: u8,

    /// Reserved, must be zero.
    pub reserved: u8,

    /// Greeting payload. Bytes past `msg_len` are zero.
    pub msg: [u8; MAX_MESSAGE],
}

// Compile-time size guard. If this fails, the wire format has silently changed.
assert_eq_size!(HelloDatagram, [u8; 32]);

impl HelloDatagram {
    /// Build a hello carrying `msg` as the greeting.
    pub fn new(node_id: NodeId, rssi: i16, msg: &[u8]) -> Result<Self, WireError> {
        if msg.len() > MAX_MESSAGE {
            return Err(WireError::MessageTooLong(msg.len()));
        }
        let mut padded = [0u8; MAX_MESSAGE];
        padded[..msg.len()].copy_from_slice(msg);
        Ok(Self {
            node_id,
            version: HELLO_VERSION,
            flags: 0,
            rssi,
            msg_len: msg.len() as u8,
            reserved: 0,
            msg: padded,
        })
    }

    /// The greeting payload, bounded by `msg_len`.
    pub fn message(&self) -> &[u8] {
        let len = (self.msg_len as usize).min(MAX_MESSAGE);
        &self.msg[..len]
    }
}

// ── Constants ────────────────────────────────────────────────────────────────

/// Maximum greeting length in bytes.
pub const MAX_MESSAGE: usize = 24;

/// Current hello format version.
pub const HELLO_VERSION: u8 = 0x01;

/// IPv6 link-local multicast address for hello datagrams.
pub const MULTICAST_ADDR: &str = "ff02::1";

/// Default UDP port on which hellos are sent and received.
pub const HELLO_PORT: u16 = 9400;

/// Default base interval between hellos, in seconds.
pub const ANNOUNCE_BASE_SECS: u64 = 4;

/// Default upper bound on the random jitter added to each interval, in
/// seconds. Keeps co-located nodes from synchronizing their sends.
pub const ANNOUNCE_JITTER_SECS: u64 = 4;

/// Default neighbor table capacity.
pub const MAX_NEIGHBORS: usize = 5;

// ── Errors ───────────────────────────────────────────────────────────────────

/// Errors that can arise when building wire-format data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("greeting length {0} exceeds maximum {}", MAX_MESSAGE)]
    MessageTooLong(usize),

    #[error("unknown hello version: 0x{0:02x}")]
    UnknownVersion(u8),
}

// ── Tests ────────────────────────────────────────────────────────────────────
