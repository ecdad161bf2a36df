//! Receipt lookup and the receipt entity.

use std::fmt;

use super::{classify_lookup, Query, QueryData};
use crate::client::Client;
use crate::config::PHOTONS_PER_NOVA;
use crate::error::{Error, Result};
use crate::execute::{RetryPolicy, Verdict};
use crate::identity::{AccountId, TransactionId};
use crate::network::ServiceMethod;
use crate::proto::{self, Status};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// `shard.realm.num` of a schedule entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl ScheduleId {
    fn from_proto(pb: &proto::ScheduleId) -> Result<Self> {
        let field = |value: i64, what: &'static str| {
            u64::try_from(value).map_err(|_| Error::MalformedResponse(what))
        };
        Ok(Self {
            shard: field(pb.shard_num, "negative schedule shard")?,
            realm: field(pb.realm_num, "negative schedule realm")?,
            num: field(pb.schedule_num, "negative schedule number")?,
        })
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

/// NOVA ↔ USD cents, as of a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRate {
    pub nova_equiv: i32,
    pub cent_equiv: i32,
    /// Seconds since the epoch.
    pub expiration_time: Option<i64>,
}

impl ExchangeRate {
    fn from_proto(pb: &proto::ExchangeRate) -> Self {
        Self {
            nova_equiv: pb.nova_equiv,
            cent_equiv: pb.cent_equiv,
            expiration_time: pb.expiration_time.as_ref().map(|t| t.seconds),
        }
    }

    /// US cents per whole NOVA. `None` when the rate is degenerate.
    pub fn cents_per_nova(&self) -> Option<f64> {
        (self.nova_equiv != 0).then(|| f64::from(self.cent_equiv) / f64::from(self.nova_equiv))
    }

    /// US cents for `photons`.
    pub fn photons_to_cents(&self, photons: u64) -> Option<f64> {
        self.cents_per_nova()
            .map(|rate| photons as f64 / PHOTONS_PER_NOVA as f64 * rate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRates {
    pub current_rate: Option<ExchangeRate>,
    pub next_rate: Option<ExchangeRate>,
}

/// The outcome of a transaction, as decided by consensus.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionReceipt {
    /// The transaction the receipt is for, when the lookup knew it.
    pub transaction_id: Option<TransactionId>,
    pub status: Status,
    /// The status as it came off the wire. Only differs from `status` when
    /// that is [`Status::Unrecognized`].
    pub code: i32,
    /// Account created by the transaction, if it created one.
    pub account_id: Option<AccountId>,
    pub schedule_id: Option<ScheduleId>,
    pub scheduled_transaction_id: Option<TransactionId>,
    pub exchange_rates: Option<ExchangeRates>,
    pub children: Vec<TransactionReceipt>,
    pub duplicates: Vec<TransactionReceipt>,
}

impl TransactionReceipt {
    pub(crate) fn from_proto(
        pb: &proto::TransactionReceipt,
        transaction_id: Option<TransactionId>,
    ) -> Result<Self> {
        Ok(Self {
            transaction_id,
            status: Status::from_code(pb.status),
            code: pb.status,
            account_id: pb.account_id.as_ref().map(AccountId::from_proto).transpose()?,
            schedule_id: pb.schedule_id.as_ref().map(ScheduleId::from_proto).transpose()?,
            scheduled_transaction_id: pb
                .scheduled_transaction_id
                .as_ref()
                .map(TransactionId::from_proto)
                .transpose()?,
            exchange_rates: pb.exchange_rate.as_ref().map(|set| ExchangeRates {
                current_rate: set.current_rate.as_ref().map(ExchangeRate::from_proto),
                next_rate: set.next_rate.as_ref().map(ExchangeRate::from_proto),
            }),
            children: Vec::new(),
            duplicates: Vec::new(),
        })
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// `Err(ReceiptStatus)` unless the status is `Success`.
    pub fn validate_status(&self) -> Result<&Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(Error::ReceiptStatus {
            status: self.status,
            code: self.code,
            transaction_id: self
                .transaction_id
                .clone()
                .ok_or(Error::MalformedResponse("receipt without transaction id"))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Polls for a transaction's receipt until consensus has decided it.
pub type TransactionReceiptQuery = Query<TransactionReceiptQueryData>;

#[derive(Debug, Clone)]
pub struct TransactionReceiptQueryData {
    transaction_id: TransactionId,
    include_children: bool,
    include_duplicates: bool,
    validate_status: bool,
}

impl Query<TransactionReceiptQueryData> {
    pub fn new(transaction_id: TransactionId) -> Self {
        Self::from_data(TransactionReceiptQueryData {
            transaction_id,
            include_children: false,
            include_duplicates: false,
            validate_status: true,
        })
    }

    /// Also fetch receipts of child transactions.
    pub fn include_children(mut self, include: bool) -> Self {
        self.data.include_children = include;
        self
    }

    /// Also fetch receipts of duplicate submissions.
    pub fn include_duplicates(mut self, include: bool) -> Self {
        self.data.include_duplicates = include;
        self
    }

    /// With `false`, a failed receipt is returned instead of raised.
    pub fn validate_status(mut self, validate: bool) -> Self {
        self.data.validate_status = validate;
        self
    }
}

impl QueryData for TransactionReceiptQueryData {
    type Output = TransactionReceipt;

    fn method(&self) -> ServiceMethod {
        ServiceMethod::GetTransactionReceipts
    }

    fn transaction_id(&self) -> Option<&TransactionId> {
        Some(&self.transaction_id)
    }

    fn is_payment_required(&self) -> bool {
        false
    }

    fn to_query(&self, header: proto::QueryHeader) -> proto::Query {
        proto::Query {
            query: Some(proto::query::Query::TransactionGetReceipt(
                proto::TransactionGetReceiptQuery {
                    header: Some(header),
                    transaction_id: Some(self.transaction_id.to_proto()),
                    include_duplicates: self.include_duplicates,
                    include_child_receipts: self.include_children,
                },
            )),
        }
    }

    fn classify(&self, response: &proto::Response) -> (Status, Verdict) {
        match &response.response {
            Some(proto::response::Response::TransactionGetReceipt(r)) => {
                classify_lookup(r.header.as_ref(), r.receipt.as_ref())
            }
            // Let make_output report it.
            _ => (Status::Ok, Verdict::Accepted),
        }
    }

    fn make_output(&self, response: proto::Response) -> Result<TransactionReceipt> {
        let Some(proto::response::Response::TransactionGetReceipt(r)) = response.response else {
            return Err(Error::MalformedResponse("expected a receipt response"));
        };
        let pb = r
            .receipt
            .as_ref()
            .ok_or(Error::MalformedResponse("receipt response without receipt"))?;

        let mut receipt = TransactionReceipt::from_proto(pb, Some(self.transaction_id.clone()))?;
        receipt.children = r
            .child_transaction_receipts
            .iter()
            .map(|child| TransactionReceipt::from_proto(child, None))
            .collect::<Result<_>>()?;
        receipt.duplicates = r
            .duplicate_transaction_receipts
            .iter()
            .map(|dup| TransactionReceipt::from_proto(dup, Some(self.transaction_id.clone())))
            .collect::<Result<_>>()?;

        if self.validate_status {
            receipt.validate_status()?;
        }
        Ok(receipt)
    }

    fn retry_policy(&self, client: &Client) -> RetryPolicy {
        client.receipt_policy()
    }

    fn timeout(&self, client: &Client) -> std::time::Duration {
        client.settings().receipt_timeout
    }

    fn log_id(&self) -> String {
        format!("TransactionReceiptQuery:{}", self.transaction_id)
    }
}
