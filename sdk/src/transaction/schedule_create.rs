//! Schedule creation: wrap a transfer so it executes later, once enough
//! signatures have been collected on the ledger side.

use super::builder::TransactionBuilder;
use super::data::{TransactionData, TransactionKind};
use super::transfer::TransferTransactionData;
use crate::config::PHOTONS_PER_NOVA;
use crate::crypto::PublicKey;
use crate::error::{Error, Result};
use crate::identity::{AccountId, Timestamp};
use crate::network::ServiceMethod;
use crate::proto;
use crate::proto::schedulable_transaction_body::Data as SchedulableData;
use crate::proto::transaction_body::Data as WireData;

/// Creates a schedule entity holding an inner transaction.
pub type ScheduleCreateTransaction = TransactionBuilder<ScheduleCreateTransactionData>;

const DEFAULT_SCHEDULE_CREATE_FEE: u64 = 5 * PHOTONS_PER_NOVA;

/// The inner transaction of a schedule. Only transfers can be scheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduledBody {
    pub transfer: TransferTransactionData,
    pub memo: String,
    pub max_transaction_fee: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleCreateTransactionData {
    scheduled: Option<ScheduledBody>,
    schedule_memo: String,
    admin_key: Option<PublicKey>,
    payer_account_id: Option<AccountId>,
    expiration_time: Option<Timestamp>,
    wait_for_expiry: bool,
}

impl ScheduleCreateTransactionData {
    pub fn scheduled(&self) -> Option<&ScheduledBody> {
        self.scheduled.as_ref()
    }

    pub fn schedule_memo(&self) -> &str {
        &self.schedule_memo
    }

    pub fn admin_key(&self) -> Option<&PublicKey> {
        self.admin_key.as_ref()
    }

    pub fn payer_account_id(&self) -> Option<&AccountId> {
        self.payer_account_id.as_ref()
    }

    pub fn expiration_time(&self) -> Option<Timestamp> {
        self.expiration_time
    }

    pub fn wait_for_expiry(&self) -> bool {
        self.wait_for_expiry
    }

    pub(crate) fn to_proto(&self) -> proto::ScheduleCreateTransactionBody {
        proto::ScheduleCreateTransactionBody {
            scheduled_transaction_body: self.scheduled.as_ref().map(|inner| {
                proto::SchedulableTransactionBody {
                    transaction_fee: inner.max_transaction_fee,
                    memo: inner.memo.clone(),
                    data: Some(SchedulableData::CryptoTransfer(inner.transfer.to_proto())),
                }
            }),
            memo: self.schedule_memo.clone(),
            admin_key: self.admin_key.as_ref().map(PublicKey::to_proto_key),
            payer_account_id: self.payer_account_id.as_ref().map(AccountId::to_proto),
            expiration_time: self.expiration_time.as_ref().map(Timestamp::to_proto),
            wait_for_expiry: self.wait_for_expiry,
        }
    }

    pub(crate) fn from_proto(body: &proto::ScheduleCreateTransactionBody) -> Result<Self> {
        let scheduled = match &body.scheduled_transaction_body {
            None => None,
            Some(inner) => {
                let transfer = match &inner.data {
                    Some(SchedulableData::CryptoTransfer(transfer)) => {
                        TransferTransactionData::from_proto(transfer)?
                    }
                    None => {
                        return Err(Error::UnsupportedTransaction(
                            "scheduled body is empty".into(),
                        ))
                    }
                };
                Some(ScheduledBody {
                    transfer,
                    memo: inner.memo.clone(),
                    max_transaction_fee: inner.transaction_fee,
                })
            }
        };
        Ok(Self {
            scheduled,
            schedule_memo: body.memo.clone(),
            admin_key: body
                .admin_key
                .as_ref()
                .map(PublicKey::from_proto_key)
                .transpose()?,
            payer_account_id: body
                .payer_account_id
                .as_ref()
                .map(AccountId::from_proto)
                .transpose()?,
            expiration_time: body.expiration_time.as_ref().map(Timestamp::from_proto),
            wait_for_expiry: body.wait_for_expiry,
        })
    }

    pub fn from_wire(data: &WireData) -> Result<Self> {
        match data {
            WireData::ScheduleCreate(body) => Self::from_proto(body),
            _ => Err(Error::UnsupportedTransaction(
                "expected a schedule create body".into(),
            )),
        }
    }
}

impl TransactionData for ScheduleCreateTransactionData {
    fn kind(&self) -> TransactionKind {
        TransactionKind::ScheduleCreate
    }

    fn method(&self) -> ServiceMethod {
        ServiceMethod::CreateSchedule
    }

    fn to_wire_body(&self) -> WireData {
        WireData::ScheduleCreate(self.to_proto())
    }

    fn default_max_transaction_fee(&self) -> u64 {
        DEFAULT_SCHEDULE_CREATE_FEE
    }

    fn validate(&self) -> Result<()> {
        let Some(inner) = &self.scheduled else {
            return Err(Error::Validation("no transaction to schedule".into()));
        };
        inner.transfer.validate()?;
        if self.wait_for_expiry && self.expiration_time.is_none() {
            return Err(Error::Validation(
                "wait_for_expiry needs an expiration time".into(),
            ));
        }
        Ok(())
    }
}

impl TransactionBuilder<ScheduleCreateTransactionData> {
    /// Schedule `transaction`. Its transfers, memo and fee ceiling are
    /// copied; its id and node list are ignored (the ledger assigns the
    /// scheduled id).
    pub fn scheduled_transaction(
        &mut self,
        transaction: &TransactionBuilder<TransferTransactionData>,
    ) -> Result<&mut Self> {
        let inner = ScheduledBody {
            transfer: transaction.data().clone(),
            memo: transaction.get_memo().to_string(),
            max_transaction_fee: transaction
                .get_max_transaction_fee()
                .unwrap_or_else(|| transaction.data().default_max_transaction_fee()),
        };
        self.data_mut()?.scheduled = Some(inner);
        Ok(self)
    }

    pub fn schedule_memo(&mut self, memo: impl Into<String>) -> Result<&mut Self> {
        self.data_mut()?.schedule_memo = memo.into();
        Ok(self)
    }

    pub fn admin_key(&mut self, key: PublicKey) -> Result<&mut Self> {
        self.data_mut()?.admin_key = Some(key);
        Ok(self)
    }

    pub fn payer_account_id(&mut self, account_id: AccountId) -> Result<&mut Self> {
        account_id.check_wire_range()?;
        self.data_mut()?.payer_account_id = Some(account_id);
        Ok(self)
    }

    pub fn expiration_time(&mut self, at: Timestamp) -> Result<&mut Self> {
        self.data_mut()?.expiration_time = Some(at);
        Ok(self)
    }

    pub fn wait_for_expiry(&mut self, wait: bool) -> Result<&mut Self> {
        self.data_mut()?.wait_for_expiry = wait;
        Ok(self)
    }
}
