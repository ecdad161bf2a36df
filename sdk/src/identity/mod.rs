//! # Identity Module
//!
//! The three identifiers every request is built from:
//!
//! 1. **[`AccountId`]**: `shard.realm.num`, or an alias in place of `num`.
//! 2. **[`Timestamp`]**: seconds + nanos since the epoch, generated
//!    strictly increasing within a process.
//! 3. **[`TransactionId`]**: payer + valid start. The network deduplicates
//!    on it, and receipts and records are looked up by it.
//!
//! All three are immutable values with a text form that round-trips
//! exactly through `Display` / `FromStr`.

pub mod account_id;
pub mod timestamp;
pub mod transaction_id;

pub use account_id::AccountId;
pub use timestamp::Timestamp;
pub use transaction_id::TransactionId;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while parsing identifiers from text or wire form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text does not have the expected shape.
    #[error("invalid {kind}: '{input}'")]
    InvalidFormat {
        /// What we were trying to parse.
        kind: &'static str,
        /// The offending input.
        input: String,
    },

    /// A numeric component is not a number, or does not fit.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// A wire message is missing a field the identifier cannot do without.
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// A wire value is negative or otherwise out of range.
    #[error("value out of range: {0}")]
    OutOfRange(&'static str),
}

pub(crate) fn parse_u64(s: &str) -> Result<u64, ParseError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidNumber(s.to_string()));
    }
    s.parse::<u64>()
        .map_err(|_| ParseError::InvalidNumber(s.to_string()))
}
