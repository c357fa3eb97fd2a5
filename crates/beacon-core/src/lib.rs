//! beacon-core — shared types, wire format, and configuration.
//! All other beacon crates depend on this one.

pub mod config;
pub mod wire;

pub use wire::NodeId;
