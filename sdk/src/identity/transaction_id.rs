//! Transaction identifiers.
//!
//! ```text
//! 0.0.1001@1700000000.000000042              plain
//! 0.0.1001@1700000000.000000042?scheduled    the scheduled inner transaction
//! 0.0.1001@1700000000.000000042/3            child with nonce 3
//! ```
//!
//! The id is the network's deduplication key: two submissions with the same
//! id are one transaction as far as the ledger is concerned. That's what
//! makes retrying a send safe.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{AccountId, ParseError, Timestamp};
use crate::client::Client;
use crate::error::Result;
use crate::proto;
use crate::query::{TransactionReceipt, TransactionReceiptQuery, TransactionRecord, TransactionRecordQuery};

const SCHEDULED_SUFFIX: &str = "?scheduled";

/// Payer account + valid start, plus the scheduled marker and child nonce.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TransactionId {
    pub account_id: AccountId,
    pub valid_start: Timestamp,
    pub scheduled: bool,
    pub nonce: Option<i32>,
}

impl TransactionId {
    pub fn new(account_id: AccountId, valid_start: Timestamp) -> Self {
        Self {
            account_id,
            valid_start,
            scheduled: false,
            nonce: None,
        }
    }

    /// A new id paid by `payer`, with a freshly generated valid start.
    ///
    /// Strictly increasing across calls within the process, so two ids
    /// generated back to back for the same payer never collide.
    pub fn generate(payer: AccountId) -> Self {
        Self::new(payer, Timestamp::generate())
    }

    pub fn with_scheduled(mut self, scheduled: bool) -> Self {
        self.scheduled = scheduled;
        self
    }

    pub fn with_nonce(mut self, nonce: i32) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Poll for the receipt of the transaction this id names.
    pub async fn get_receipt(&self, client: &Client) -> Result<TransactionReceipt> {
        TransactionReceiptQuery::new(self.clone()).execute(client).await
    }

    /// Fetch the record of the transaction this id names. Waits for the
    /// receipt first, so a record is only asked for once it exists.
    pub async fn get_record(&self, client: &Client) -> Result<TransactionRecord> {
        self.get_receipt(client).await?;
        TransactionRecordQuery::new(self.clone()).execute(client).await
    }

    pub fn to_proto(&self) -> proto::TransactionId {
        proto::TransactionId {
            transaction_valid_start: Some(self.valid_start.to_proto()),
            account_id: Some(self.account_id.to_proto()),
            scheduled: self.scheduled,
            nonce: self.nonce.unwrap_or(0),
        }
    }

    pub fn from_proto(pb: &proto::TransactionId) -> std::result::Result<Self, ParseError> {
        let account = pb
            .account_id
            .as_ref()
            .ok_or(ParseError::MissingField("account_id"))?;
        let valid_start = pb
            .transaction_valid_start
            .as_ref()
            .ok_or(ParseError::MissingField("transaction_valid_start"))?;
        Ok(Self {
            account_id: AccountId::from_proto(account)?,
            valid_start: Timestamp::from_proto(valid_start),
            scheduled: pb.scheduled,
            nonce: (pb.nonce != 0).then_some(pb.nonce),
        })
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account_id, self.valid_start)?;
        if self.scheduled {
            f.write_str(SCHEDULED_SUFFIX)?;
        }
        if let Some(nonce) = self.nonce {
            write!(f, "/{nonce}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({self})")
    }
}

impl FromStr for TransactionId {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidFormat {
            kind: "transaction id",
            input: s.to_string(),
        };

        let (account, rest) = s.split_once('@').ok_or_else(invalid)?;

        let (rest, nonce) = match rest.split_once('/') {
            Some((head, nonce)) => {
                let nonce = super::parse_u64(nonce)?;
                let nonce = i32::try_from(nonce).map_err(|_| invalid())?;
                (head, Some(nonce))
            }
            None => (rest, None),
        };

        let (rest, scheduled) = match rest.strip_suffix(SCHEDULED_SUFFIX) {
            Some(head) => (head, true),
            None => (rest, false),
        };

        Ok(Self {
            account_id: account.parse()?,
            valid_start: rest.parse()?,
            scheduled,
            nonce,
        })
    }
}

impl Serialize for TransactionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
