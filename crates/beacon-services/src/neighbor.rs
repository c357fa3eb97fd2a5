//! Neighbor table — bounded record of recently heard peers, ranked by RSSI.
//!
//! Each received hello becomes one observation. The table keeps at most
//! `capacity` entries, one per node id, in non-increasing RSSI order. When
//! the table is full, a newcomer is admitted only if it strictly outranks
//! the current weakest entry, which is then evicted. A newcomer that does
//! not outrank anyone is rejected — a defined outcome the caller logs and
//! moves past, not a fault.
//!
//! The eviction check compares against the tail and is valid only because
//! the table is re-sorted before every `observe` returns. That re-sort is
//! an invariant, not an optimization.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use beacon_core::wire::NodeId;

/// One observed peer.
#[derive(Debug, Clone)]
pub struct Neighbor {
    /// The peer's node id, from the hello datagram.
    pub addr: NodeId,

    /// Sender-reported link metric. Higher is stronger.
    /// Overwritten on every re-observation of the same id.
    pub rssi: i16,

    /// Last time a hello arrived from this peer. Telemetry only — entries
    /// are never expired, only evicted or dropped at process exit.
    pub last_seen: Instant,
}

/// A full table refused an observation: the newcomer does not strictly
/// outrank the weakest current entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("table full: {addr} at rssi {rssi} does not outrank the weakest entry (rssi {weakest})")]
pub struct Rejected {
    pub addr: NodeId,
    pub rssi: i16,
    pub weakest: i16,
}

/// Construction faults.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("neighbor table capacity must be at least 1")]
    ZeroCapacity,
}

/// Bounded neighbor table. At most `capacity` entries, unique by node id,
/// always in non-increasing RSSI order once `observe` has returned.
#[derive(Debug)]
pub struct NeighborTable {
    entries: Vec<Neighbor>,
    capacity: usize,
}

impl NeighborTable {
    /// Create an empty table. Storage is reserved up front; `observe` never
    /// allocates.
    pub fn new(capacity: usize) -> Result<Self, TableError> {
        if capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }
        Ok(Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        })
    }

    /// Admit one observation.
    ///
    /// A known id is updated in place. An unknown id is inserted, evicting
    /// the weakest entry if the table is full and the newcomer strictly
    /// outranks it; otherwise the observation is rejected and the table is
    /// left untouched. The table is re-sorted before returning on every
    /// mutating path.
    pub fn observe(&mut self, addr: NodeId, rssi: i16) -> Result<(), Rejected> {
        debug_assert!(self.is_sorted(), "sort invariant must hold on entry");

        if let Some(entry) = self.entries.iter_mut().find(|n| n.addr == addr) {
            entry.rssi = rssi;
            entry.last_seen = Instant::now();
        } else {
            if self.entries.len() == self.capacity {
                // The tail is the weakest entry. Valid only under the sort
                // invariant — see the module docs.
                if let Some(weakest) = self.entries.last() {
                    if rssi <= weakest.rssi {
                        tracing::debug!(
                            addr = %addr,
                            rssi,
                            weakest = weakest.rssi,
                            "observation rejected: table full and newcomer does not outrank weakest"
                        );
                        return Err(Rejected {
                            addr,
                            rssi,
                            weakest: weakest.rssi,
                        });
                    }
                }
                if let Some(evicted) = self.entries.pop() {
                    tracing::debug!(
                        addr = %evicted.addr,
                        rssi = evicted.rssi,
                        "evicting weakest neighbor"
                    );
                }
            }
            self.entries.push(Neighbor {
                addr,
                rssi,
                last_seen: Instant::now(),
            });
        }

        // Stable sort: entries with equal RSSI keep their relative order, so
        // repeated observations of the same peer set report deterministically.
        self.entries.sort_by(|a, b| b.rssi.cmp(&a.rssi));
        Ok(())
    }

    /// The table in its maintained descending-RSSI order. Read-only.
    pub fn snapshot(&self) -> &[Neighbor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].rssi >= w[1].rssi)
    }
}

/// The neighbor table shared between the listener and any reporting task.
///
/// Hold the lock across the whole observe-and-report sequence: admission,
/// eviction, and the re-sort must never be seen mid-update.
pub type SharedTable = Arc<Mutex<NeighborTable>>;

/// Create a new shared table handle.
pub fn new_shared_table(capacity: usize) -> Result<SharedTable, TableError> {
    Ok(Arc::new(Mutex::new(NeighborTable::new(capacity)?)))
}
