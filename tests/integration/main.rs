//! Beacon integration test harness.
//!
//! These tests run entirely in-process: hellos are built with the real wire
//! types, parsed back, and fed through the real neighbor table. No multicast
//! environment or elevated privileges are required.

use beacon_core::wire::NodeId;
use beacon_services::NeighborTable;

mod flow;
mod ranking;

// ── Harness ──────────────────────────────────────────────────────────────────

pub fn node(a: u8, b: u8) -> NodeId {
    NodeId([a, b])
}

pub fn table_ids(table: &NeighborTable) -> Vec<NodeId> {
    table.snapshot().iter().map(|n| n.addr).collect()
}

pub fn table_rssis(table: &NeighborTable) -> Vec<i16> {
    table.snapshot().iter().map(|n| n.rssi).collect()
}

/// Assert the three table invariants: bounded size, unique ids, and
/// non-increasing RSSI order.
pub fn assert_invariants(table: &NeighborTable) {
    assert!(
        table.len() <= table.capacity(),
        "table exceeded its capacity"
    );

    let ids = table_ids(table);
    for (i, id) in ids.iter().enumerate() {
        assert!(
            !ids[i + 1..].contains(id),
            "node {id} appears twice in the table"
        );
    }

    let rssis = table_rssis(table);
    assert!(
        rssis.windows(2).all(|w| w[0] >= w[1]),
        "table not in descending RSSI order: {rssis:?}"
    );
}

/// Small deterministic PRNG so storm tests are reproducible.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}
