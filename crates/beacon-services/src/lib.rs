//! beacon-services — shared runtime state for the beacon daemon.

pub mod neighbor;

pub use neighbor::{new_shared_table, Neighbor, NeighborTable, Rejected, SharedTable, TableError};
