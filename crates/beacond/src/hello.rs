//! Hello announcement broadcast.
//!
//! Periodically sends a HelloDatagram to the link-local multicast address
//! ff02::1 so nearby peers can hear this node and rank its signal.

use std::net::{Ipv6Addr, SocketAddrV6};
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::time;
use zerocopy::AsBytes;

use beacon_core::wire::{HelloDatagram, NodeId, MULTICAST_ADDR};

/// Announce loop parameters, taken from config at startup.
#[derive(Debug, Clone)]
pub struct AnnounceSettings {
    /// Fixed base interval between sends.
    pub base: Duration,
    /// Upper bound on the random jitter added per interval.
    pub jitter: Duration,
    /// Greeting carried in each hello.
    pub message: Vec<u8>,
    /// Advertised link metric.
    pub rssi: i16,
}

/// Broadcast hellos on a jittered interval.
///
/// Runs forever — cancel by dropping the task handle.
pub async fn announce_loop(
    node_id: NodeId,
    interface_index: u32,
    port: u16,
    settings: AnnounceSettings,
) -> Result<()> {
    let socket = make_multicast_socket(interface_index)
        .context("failed to create multicast announce socket")?;

    let multicast: Ipv6Addr = MULTICAST_ADDR
        .parse()
        .context("invalid multicast address constant")?;
    let dest = SocketAddrV6::new(multicast, port, 0, interface_index);

    let hello = HelloDatagram::new(node_id, settings.rssi, &settings.message)
        .context("announce message does not fit in a hello datagram")?;

    tracing::info!(
        node = %node_id,
        base_secs = settings.base.as_secs(),
        jitter_secs = settings.jitter.as_secs(),
        "hello broadcast starting"
    );

    loop {
        // Fixed base plus bounded random jitter, so co-located nodes do not
        // fall into lockstep.
        let jitter_ms = jitter_millis(settings.jitter);
        time::sleep(settings.base + Duration::from_millis(jitter_ms)).await;

        match socket.send_to(hello.as_bytes(), &dest.into()) {
            Ok(n) => tracing::trace!(bytes = n, "hello sent"),
            Err(e) => tracing::warn!(error = %e, "hello send failed"),
        }
    }
}

fn jitter_millis(jitter: Duration) -> u64 {
    let bound = jitter.as_millis() as u64;
    if bound == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..bound)
    }
}

/// Create a UDP socket suitable for sending IPv6 multicast.
fn make_multicast_socket(interface_index: u32) -> Result<socket2::Socket> {
    let socket = Socket::new(Domain::IPV6, Type::DGRAM, Some(Protocol::UDP))
        .context("socket()")?;

    socket.set_reuse_address(true).context("SO_REUSEADDR")?;
    socket.set_multicast_if_v6(interface_index).context("IPV6_MULTICAST_IF")?;
    // Hops 1 — link-local only, do not route beyond this link
    socket.set_multicast_hops_v6(1).context("IPV6_MULTICAST_HOPS")?;

    Ok(socket)
}

/// Get the OS interface index for a named network interface.
/// Returns an error if the interface does not exist.
pub fn if_index(name: &str) -> Result<u32> {
    let name_cstr = std::ffi::CString::new(name).context("interface name contains null byte")?;
    let index = unsafe { libc::if_nametoindex(name_cstr.as_ptr()) };
    if index == 0 {
        anyhow::bail!("interface '{}' not found", name);
    }
    Ok(index)
}
