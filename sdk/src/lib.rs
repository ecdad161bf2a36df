// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NOVA SDK Client Library
//!
//! Everything a client needs to talk to a NOVA ledger that only exists on the
//! other side of a handful of remote nodes: build a request, freeze it, sign
//! it, ship it, and find out what actually happened.
//!
//! ## Lifecycle
//!
//! ```text
//! TransactionBuilder ──freeze_with──▶ Transaction ──sign──▶ execute ──▶ TransactionResponse
//!                                                                        │
//!                                                   get_receipt / get_record
//! ```
//!
//! A builder is mutable. A frozen [`transaction::Transaction`] is not: its
//! transaction id, node list and per-node body bytes are fixed, and the only
//! thing that can still grow is its signature set.
//!
//! ## Architecture
//!
//! - **identity**: account ids, timestamps, transaction ids.
//! - **crypto**: Ed25519 keys, the async [`crypto::Signer`] capability, SHA-384.
//! - **proto** / **codec**: protobuf wire messages and the canonical bytes built from them.
//! - **network**: the node map, node health, and the gRPC channel seam.
//! - **execute**: the retry/backoff engine shared by transactions and queries.
//! - **transaction**: the freeze → sign → execute state machine and concrete kinds.
//! - **query**: receipt and record lookups.
//! - **client**: ties the network map, operator and defaults together.
//! - **config** / **logging**: constants, JSON client config, tracing setup.
//!
//! ## Ground rules
//!
//! 1. Bytes that were signed are the bytes that get sent. Every retry included.
//! 2. Transient failures are the engine's problem. Terminal ones are yours.
//! 3. If it touches money, it has tests. Plural.

pub mod client;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod execute;
pub mod identity;
pub mod logging;
pub mod network;
pub mod proto;
pub mod query;
pub mod transaction;

pub use client::Client;
pub use crypto::{PrivateKey, PublicKey, Signer};
pub use error::{Error, Result};
pub use identity::{AccountId, Timestamp, TransactionId};
pub use proto::Status;
pub use query::{TransactionReceipt, TransactionReceiptQuery, TransactionRecord, TransactionRecordQuery};
pub use transaction::{
    AnyTransaction, ScheduleCreateTransaction, Transaction, TransactionBuilder,
    TransactionResponse, TransferTransaction,
};
