//! # Transactions
//!
//! The freeze → sign → execute state machine, shared by every kind, and the
//! concrete kinds built on it.
//!
//! | Piece                   | Role                                             |
//! |-------------------------|--------------------------------------------------|
//! | [`TransactionBuilder`]  | mutable; setters fault once frozen               |
//! | [`Transaction`]         | frozen; collects signatures, executes once       |
//! | [`TransactionData`]     | what a kind plugs in: wire body, RPC, defaults   |
//! | [`AnyTransactionData`]  | closed set of kinds, decoded via a static table  |
//! | [`TransactionResponse`] | accepted-by-node handle; leads to the receipt    |

mod builder;
mod data;
mod lifecycle;
mod response;
mod schedule_create;
mod signing;
mod transfer;

pub use builder::TransactionBuilder;
pub use data::{kind_of, AnyTransactionData, TransactionData, TransactionKind};
pub use lifecycle::{AnyTransaction, Transaction};
pub use response::TransactionResponse;
pub use schedule_create::{ScheduleCreateTransaction, ScheduleCreateTransactionData, ScheduledBody};
pub use signing::{SignaturePair, SignatureSet};
pub use transfer::{Transfer, TransferTransaction, TransferTransactionData};
