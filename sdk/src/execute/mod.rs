//! # Execution Engine
//!
//! Sends frozen, signed requests to nodes and decides, answer by answer,
//! whether to return, rotate, wait, or give up.
//!
//! - `backoff.rs` : retry delays (exponential, jittered, capped)
//! - `classify.rs`: status → [`Verdict`]
//! - `engine.rs`  : the loop itself
//!
//! The engine never re-signs or re-encodes. The request for a node is built
//! once per execution and every retry to that node sends the same bytes, so
//! the network's transaction-id deduplication stays meaningful.

pub mod backoff;
pub mod classify;
pub(crate) mod engine;

pub use backoff::RetryPolicy;
pub use classify::Verdict;
