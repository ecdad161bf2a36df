//! Error types for the NOVA SDK.
//!
//! Every fallible SDK operation returns [`Error`]. The variants fall into
//! the classes a caller actually needs to tell apart:
//!
//! - **Programming errors**: mutating a frozen builder, executing twice,
//!   sending with no signatures, signing as the wrong payer.
//! - **Terminal precheck errors**: a node looked at the request and said no.
//! - **Exhaustion**: the retry budget or the deadline ran out. These carry
//!   the last thing each node said, because "it failed" is not a diagnosis.
//! - **Plumbing**: decode, key, signer and config failures.
//!
//! Transient node and network hiccups never show up here; the execution
//! engine absorbs them.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::crypto::{KeyError, SignerError};
use crate::identity::{AccountId, ParseError, TransactionId};
use crate::proto::Status;

/// Shorthand used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// The lifecycle state that made an operation illegal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalStateKind {
    Frozen,
    Executed,
}

impl fmt::Display for IllegalStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalStateKind::Frozen => write!(f, "frozen"),
            IllegalStateKind::Executed => write!(f, "executed"),
        }
    }
}

/// What a single attempt against a node ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The node answered with a precheck status.
    Precheck(Status),
    /// The call failed at the transport level.
    Transport(tonic::Code),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Precheck(status) => write!(f, "{status}"),
            AttemptOutcome::Transport(code) => write!(f, "transport {code:?}"),
        }
    }
}

/// Last observed outcome per node, in the order nodes were first tried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastStatuses {
    entries: Vec<(AccountId, AttemptOutcome)>,
}

impl LastStatuses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome, replacing whatever the node said before.
    pub fn record(&mut self, node: AccountId, outcome: AttemptOutcome) {
        match self.entries.iter_mut().find(|(id, _)| *id == node) {
            Some(entry) => entry.1 = outcome,
            None => self.entries.push((node, outcome)),
        }
    }

    pub fn get(&self, node: &AccountId) -> Option<&AttemptOutcome> {
        self.entries
            .iter()
            .find(|(id, _)| id == node)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(AccountId, AttemptOutcome)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for LastStatuses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "no node answered");
        }
        for (i, (node, outcome)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{node}: {outcome}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Everything that can go wrong between building a request and reading its
/// receipt.
#[derive(Debug, Error)]
pub enum Error {
    /// A mutator ran on a frozen builder, or a transaction was executed twice.
    #[error("illegal state: request is already {kind}")]
    IllegalState { kind: IllegalStateKind },

    /// `execute` was called on a transaction nobody signed, and the client
    /// has no operator to sign it.
    #[error("transaction {transaction_id} has no signatures")]
    NoSignatures { transaction_id: TransactionId },

    /// `sign_as_payer` with an account other than the transaction's payer.
    #[error("payer mismatch: transaction is paid by {expected}, signer is {actual}")]
    PayerMismatch {
        expected: AccountId,
        actual: AccountId,
    },

    /// An operation needed the client operator and none is configured.
    #[error("client has no operator configured")]
    NoOperator,

    /// `freeze` without a client needs these fields to be set explicitly.
    #[error("cannot freeze: {0} is not set")]
    FreezeIncomplete(&'static str),

    /// The client's network map has no nodes to pick from.
    #[error("network has no nodes")]
    EmptyNetwork,

    /// A node account id is not in the client's network map.
    #[error("node {0} is not part of the network")]
    UnknownNode(AccountId),

    /// Re-freezing against a network that cannot honor the already
    /// bound node list.
    #[error("freeze conflict: bound node {node} is not in the client network")]
    FreezeConflict { node: AccountId },

    /// A node rejected the request with a non-retryable precheck status.
    #[error("precheck failed with {status} on node {node} (transaction {transaction_id:?})")]
    Precheck {
        status: Status,
        transaction_id: Option<TransactionId>,
        node: AccountId,
    },

    /// A receipt reached a terminal failure status. `code` is the raw wire
    /// value, which matters when `status` is `Unrecognized`.
    #[error("receipt for {transaction_id} has status {status} (code {code})")]
    ReceiptStatus {
        status: Status,
        code: i32,
        transaction_id: TransactionId,
    },

    /// A transport error that retrying will not fix.
    #[error("transport error on node {node}: {status}")]
    Transport { node: AccountId, status: tonic::Status },

    /// The execution deadline elapsed.
    #[error("timed out after {elapsed:?} and {attempts} attempts ({last})")]
    Timeout {
        elapsed: Duration,
        attempts: u32,
        last: LastStatuses,
    },

    /// The retry budget ran out before any node accepted the request.
    #[error("gave up after {attempts} attempts ({last})")]
    MaxAttemptsExceeded { attempts: u32, last: LastStatuses },

    /// A paid query would cost more than the configured ceiling.
    #[error("query payment {payment} exceeds the maximum of {max}")]
    QueryPaymentTooHigh { payment: u64, max: u64 },

    /// A per-node signature list did not line up with the node list.
    #[error("expected {expected} signatures (one per node), got {actual}")]
    SignatureCount { expected: usize, actual: usize },

    /// A request field failed local validation.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A response decoded fine but is missing what its kind must carry.
    #[error("malformed response: {0}")]
    MalformedResponse(&'static str),

    /// Serialized bytes hold a transaction kind this build cannot decode.
    #[error("unsupported transaction kind: {0}")]
    UnsupportedTransaction(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Precheck or receipt status carried by the error, if any.
    pub fn status(&self) -> Option<Status> {
        match self {
            Error::Precheck { status, .. } | Error::ReceiptStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for the two exhaustion variants.
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::MaxAttemptsExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(num: u64) -> AccountId {
        AccountId::new(0, 0, num)
    }

    #[test]
    fn test_last_statuses_keeps_latest_per_node() {
        let mut last = LastStatuses::new();
        last.record(node(3), AttemptOutcome::Precheck(Status::Busy));
        last.record(node(4), AttemptOutcome::Transport(tonic::Code::Unavailable));
        last.record(node(3), AttemptOutcome::Precheck(Status::PlatformNotActive));

        assert_eq!(last.len(), 2);
        assert_eq!(
            last.get(&node(3)),
            Some(&AttemptOutcome::Precheck(Status::PlatformNotActive))
        );
        assert_eq!(
            last.to_string(),
            "0.0.3: PlatformNotActive, 0.0.4: transport Unavailable"
        );
    }

    #[test]
    fn test_error_status_accessor() {
        let err = Error::Precheck {
            status: Status::InvalidSignature,
            transaction_id: None,
            node: node(3),
        };
        assert_eq!(err.status(), Some(Status::InvalidSignature));
        assert!(!err.is_exhausted());

        let err = Error::MaxAttemptsExceeded {
            attempts: 3,
            last: LastStatuses::new(),
        };
        assert!(err.is_exhausted());
        assert!(err.to_string().contains("no node answered"));
    }
}
