//! Per-kind transaction data and the decoder registry.
//!
//! The shared lifecycle (freeze, sign, execute) knows nothing about what a
//! transaction *does*. Each kind plugs in through [`TransactionData`]: its
//! wire body, the RPC that accepts it, and a few defaults.
//!
//! Going the other way (bytes back to a typed transaction) uses a static
//! table from the body's wire case to a decoder function. The set of kinds
//! is closed: [`AnyTransactionData`] is an enum, not a trait object.

use std::fmt;

use async_trait::async_trait;

use super::schedule_create::ScheduleCreateTransactionData;
use super::transfer::TransferTransactionData;
use crate::config::DEFAULT_MAX_TRANSACTION_FEE;
use crate::error::{Error, Result};
use crate::identity::TransactionId;
use crate::network::{Channel, ServiceMethod};
use crate::proto;
use crate::proto::transaction_body::Data as WireData;

// ---------------------------------------------------------------------------
// TransactionKind
// ---------------------------------------------------------------------------

/// The transaction kinds this SDK can build and decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Transfer,
    ScheduleCreate,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Transfer => write!(f, "TransferTransaction"),
            TransactionKind::ScheduleCreate => write!(f, "ScheduleCreateTransaction"),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionData
// ---------------------------------------------------------------------------

/// What a transaction kind contributes to the shared lifecycle.
#[async_trait]
pub trait TransactionData: Clone + fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> TransactionKind;

    /// The RPC that accepts this kind.
    fn method(&self) -> ServiceMethod;

    /// The kind-specific part of the transaction body.
    fn to_wire_body(&self) -> WireData;

    /// Fee ceiling when neither the caller nor the client sets one.
    fn default_max_transaction_fee(&self) -> u64 {
        DEFAULT_MAX_TRANSACTION_FEE
    }

    /// Local sanity checks, run at freeze.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// `Kind:seconds.nanos`, for logs.
    fn log_id(&self, transaction_id: &TransactionId) -> String {
        format!("{}:{}", self.kind(), transaction_id.valid_start)
    }

    /// Submit one signed envelope to one node.
    async fn execute_on(
        &self,
        channel: &dyn Channel,
        request: proto::Transaction,
    ) -> std::result::Result<proto::TransactionResponse, tonic::Status> {
        channel.submit_transaction(self.method(), request).await
    }
}

// ---------------------------------------------------------------------------
// AnyTransactionData
// ---------------------------------------------------------------------------

/// Data of any supported kind. What [`super::AnyTransaction::from_bytes`]
/// decodes into.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyTransactionData {
    Transfer(TransferTransactionData),
    ScheduleCreate(ScheduleCreateTransactionData),
}

impl From<TransferTransactionData> for AnyTransactionData {
    fn from(data: TransferTransactionData) -> Self {
        AnyTransactionData::Transfer(data)
    }
}

impl From<ScheduleCreateTransactionData> for AnyTransactionData {
    fn from(data: ScheduleCreateTransactionData) -> Self {
        AnyTransactionData::ScheduleCreate(data)
    }
}

impl TransactionData for AnyTransactionData {
    fn kind(&self) -> TransactionKind {
        match self {
            AnyTransactionData::Transfer(d) => d.kind(),
            AnyTransactionData::ScheduleCreate(d) => d.kind(),
        }
    }

    fn method(&self) -> ServiceMethod {
        match self {
            AnyTransactionData::Transfer(d) => d.method(),
            AnyTransactionData::ScheduleCreate(d) => d.method(),
        }
    }

    fn to_wire_body(&self) -> WireData {
        match self {
            AnyTransactionData::Transfer(d) => d.to_wire_body(),
            AnyTransactionData::ScheduleCreate(d) => d.to_wire_body(),
        }
    }

    fn default_max_transaction_fee(&self) -> u64 {
        match self {
            AnyTransactionData::Transfer(d) => d.default_max_transaction_fee(),
            AnyTransactionData::ScheduleCreate(d) => d.default_max_transaction_fee(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            AnyTransactionData::Transfer(d) => d.validate(),
            AnyTransactionData::ScheduleCreate(d) => d.validate(),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

type Decoder = fn(&WireData) -> Result<AnyTransactionData>;

/// Body oneof tag → kind → decoder.
static REGISTRY: &[(u32, TransactionKind, Decoder)] = &[
    (14, TransactionKind::Transfer, |data| {
        TransferTransactionData::from_wire(data).map(AnyTransactionData::from)
    }),
    (42, TransactionKind::ScheduleCreate, |data| {
        ScheduleCreateTransactionData::from_wire(data).map(AnyTransactionData::from)
    }),
];

fn wire_tag(data: &WireData) -> u32 {
    match data {
        WireData::CryptoTransfer(_) => 14,
        WireData::ScheduleCreate(_) => 42,
    }
}

/// The kind a wire body decodes to, if this build knows it.
pub fn kind_of(data: &WireData) -> Option<TransactionKind> {
    let tag = wire_tag(data);
    REGISTRY
        .iter()
        .find(|(t, _, _)| *t == tag)
        .map(|(_, kind, _)| *kind)
}

impl AnyTransactionData {
    /// Decode the kind-specific part of a body through the registry.
    pub fn from_wire(data: Option<&WireData>) -> Result<Self> {
        let data = data.ok_or_else(|| Error::UnsupportedTransaction("empty body".into()))?;
        let tag = wire_tag(data);
        let (_, _, decode) = REGISTRY
            .iter()
            .find(|(t, _, _)| *t == tag)
            .ok_or_else(|| Error::UnsupportedTransaction(format!("body field {tag}")))?;
        decode(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{AccountId, Timestamp};

    #[test]
    fn kind_display_names() {
        assert_eq!(TransactionKind::Transfer.to_string(), "TransferTransaction");
        assert_eq!(
            TransactionKind::ScheduleCreate.to_string(),
            "ScheduleCreateTransaction"
        );
    }

    #[test]
    fn log_id_uses_valid_start() {
        let data = ScheduleCreateTransactionData::default();
        let id = TransactionId::new(AccountId::new(0, 0, 2), Timestamp::new(100, 7));
        assert_eq!(data.log_id(&id), "ScheduleCreateTransaction:100.000000007");
    }

    #[test]
    fn registry_roundtrip_for_every_kind() {
        let kinds: Vec<AnyTransactionData> = vec![
            TransferTransactionData::default().into(),
            ScheduleCreateTransactionData::default().into(),
        ];
        for data in kinds {
            let wire = data.to_wire_body();
            assert_eq!(kind_of(&wire), Some(data.kind()));
            assert_eq!(AnyTransactionData::from_wire(Some(&wire)).unwrap(), data);
        }
    }

    #[test]
    fn empty_body_is_unsupported() {
        assert!(matches!(
            AnyTransactionData::from_wire(None),
            Err(Error::UnsupportedTransaction(_))
        ));
    }
}
