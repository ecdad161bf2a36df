//! # Network Module
//!
//! The client's view of the ledger: a fixed set of nodes, each with an
//! address, a node account id, a channel, and a health record.
//!
//! ## Architecture
//!
//! ```text
//! node.rs : per-node health: consecutive failures, backoff, last use
//! map.rs  : the node map: selection, penalize / recover
//! rpc.rs  : service methods and the Channel seam (gRPC via tonic)
//! ```
//!
//! ## Design Decisions
//!
//! - Node health sits in a `DashMap`, so penalize and recover are atomic per
//!   node without a lock around the whole map. Selection may read slightly
//!   stale health; the worst case is one extra attempt at a node that just
//!   went into backoff.
//! - Backoff deadlines use `tokio::time::Instant` so tests can run the
//!   whole thing under paused time.
//! - The node set itself never changes after construction. Only health does.

pub mod map;
pub mod node;
pub mod rpc;

pub use map::{Network, Selection};
pub use node::{NetworkNode, NodeBackoff, NodeHealthSnapshot};
pub use rpc::{Channel, GrpcChannel, ServiceMethod};
