//! Pano overview engine: joins disjoint resource collections into
//! normalized overview items.
//!
//! The pipeline is pure and synchronous: `builder::build_items` walks the
//! workload collections, resolves ownership, selects revision history,
//! aggregates alerts and links network resources. Each pass produces a
//! fresh item set; nothing here mutates its inputs.

#![forbid(unsafe_code)]

pub mod alerts;
pub mod builder;
pub mod net;
pub mod owners;
pub mod revisions;

pub use alerts::{Alert, AlertKey, AlertMap, Severity};
pub use builder::{build_items, Collections, OverviewItem};
pub use owners::owned_by;
pub use revisions::{HistoryEntry, RolloutPhase, RolloutView};
