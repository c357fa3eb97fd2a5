//! Hello listener.
//!
//! Joins the ff02::1 multicast group and listens for HelloDatagrams from
//! nearby peers. Each valid hello becomes one (node id, RSSI) observation
//! fed into the neighbor table; after every observation, admitted or not,
//! the ranked table is dumped to the log.

use std::net::{Ipv6Addr, SocketAddrV6};

use anyhow::{Context, Result};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use zerocopy::FromBytes;

use beacon_core::wire::{HelloDatagram, NodeId, HELLO_VERSION, MULTICAST_ADDR};
use beacon_services::{NeighborTable, SharedTable};

/// Listen for hellos and populate the neighbor table.
///
/// Runs forever — cancel by dropping the task handle.
pub async fn listener_loop(
    table: SharedTable,
    interface_index: u32,
    port: u16,
    local_id: NodeId,
) -> Result<()> {
    let socket = make_listener_socket(interface_index, port)
        .context("failed to create multicast listener socket")?;

    // Convert to tokio UdpSocket for async recv
    let socket = UdpSocket::from_std(socket).context("failed to convert to tokio UdpSocket")?;

    let mut buf = vec![0u8; 256];

    tracing::info!(port, "hello listener starting");

    loop {
        let (len, peer_addr) = match socket.recv_from(&mut buf).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "recv_from failed");
                continue;
            }
        };

        if !matches!(peer_addr, std::net::SocketAddr::V6(_)) {
            tracing::warn!("received IPv4 datagram on IPv6 socket, ignoring");
            continue;
        }

        handle_datagram(&table, local_id, &buf[..len]);
    }
}

/// Parse one datagram and run it through the table.
///
/// Socket-free so the receive path can be exercised without a multicast
/// environment.
fn handle_datagram(table: &SharedTable, local_id: NodeId, buf: &[u8]) {
    let hello = match HelloDatagram::read_from_prefix(buf) {
        Some(h) => h,
        None => {
            tracing::trace!(len = buf.len(), "short or malformed hello, ignoring");
            return;
        }
    };

    // Copy packed fields to locals to avoid unaligned access
    let sender = hello.node_id;
    let version = hello.version;
    let rssi = hello.rssi;

    if version != HELLO_VERSION {
        tracing::trace!(version, "unknown hello version, dropping");
        return;
    }

    // Our own hellos come back via multicast loopback
    if sender == local_id {
        tracing::trace!("ignoring own hello");
        return;
    }

    tracing::info!(
        from = %sender,
        msg = %String::from_utf8_lossy(hello.message()),
        rssi,
        "hello received"
    );

    // Hold the lock across observe + dump: admission, eviction, and the
    // re-sort must not interleave with another receive or reader.
    let mut table = table.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Err(rejected) = table.observe(sender, rssi) {
        tracing::debug!(%rejected, "observation not admitted");
    }

    dump_table(&table);
}

/// Log the ranked table, strongest first.
fn dump_table(table: &NeighborTable) {
    tracing::info!(count = table.len(), "neighbor table");
    for n in table.snapshot() {
        tracing::info!(addr = %n.addr, rssi = n.rssi, "  neighbor");
    }
}

/// Create a UDP socket joined to the ff02::1 multicast group.
fn make_listener_socket(interface_index: u32, port: u16) -> Result<std::net::UdpSocket> {
    let socket = Socket::new(Domain::IPV6, Type::DGRAM, Some(Protocol::UDP)).context("socket()")?;

    socket.set_reuse_address(true).context("SO_REUSEADDR")?;
    socket.set_only_v6(true).context("IPV6_V6ONLY")?;
    socket.set_nonblocking(true).context("set_nonblocking")?;

    let bind_addr = SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, port, 0, 0);
    socket.bind(&bind_addr.into()).context("bind()")?;

    let multicast: Ipv6Addr = MULTICAST_ADDR
        .parse()
        .context("invalid multicast address constant")?;
    socket
        .join_multicast_v6(&multicast, interface_index)
        .context("IPV6_JOIN_GROUP")?;

    Ok(socket.into())
}
