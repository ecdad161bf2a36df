//! Crypto transfers.

use super::builder::TransactionBuilder;
use super::data::{TransactionData, TransactionKind};
use crate::error::{Error, Result};
use crate::identity::AccountId;
use crate::network::ServiceMethod;
use crate::proto;
use crate::proto::transaction_body::Data as WireData;

/// Moves NOVA between accounts. Debits are negative, credits positive, and
/// the amounts must net to zero.
pub type TransferTransaction = TransactionBuilder<TransferTransactionData>;

/// One leg of a transfer, in photons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub account_id: AccountId,
    pub amount: i64,
    pub is_approval: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferTransactionData {
    transfers: Vec<Transfer>,
}

impl TransferTransactionData {
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// Add a leg. Legs for the same account and approval flag are merged.
    pub(crate) fn add(&mut self, account_id: AccountId, amount: i64, is_approval: bool) -> Result<()> {
        account_id.check_wire_range()?;
        match self
            .transfers
            .iter_mut()
            .find(|t| t.account_id == account_id && t.is_approval == is_approval)
        {
            Some(existing) => {
                existing.amount = existing.amount.checked_add(amount).ok_or_else(|| {
                    Error::Validation(format!("transfer amount for {account_id} overflows"))
                })?;
            }
            None => self.transfers.push(Transfer {
                account_id,
                amount,
                is_approval,
            }),
        }
        Ok(())
    }

    pub(crate) fn to_proto(&self) -> proto::CryptoTransferTransactionBody {
        proto::CryptoTransferTransactionBody {
            transfers: Some(proto::TransferList {
                account_amounts: self
                    .transfers
                    .iter()
                    .map(|t| proto::AccountAmount {
                        account_id: Some(t.account_id.to_proto()),
                        amount: t.amount,
                        is_approval: t.is_approval,
                    })
                    .collect(),
            }),
        }
    }

    pub(crate) fn from_proto(body: &proto::CryptoTransferTransactionBody) -> Result<Self> {
        let transfers = body
            .transfers
            .as_ref()
            .map(|list| {
                list.account_amounts
                    .iter()
                    .map(|aa| -> Result<Transfer> {
                        let account = aa
                            .account_id
                            .as_ref()
                            .ok_or(Error::MalformedResponse("transfer leg without account"))?;
                        Ok(Transfer {
                            account_id: AccountId::from_proto(account)?,
                            amount: aa.amount,
                            is_approval: aa.is_approval,
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();
        Ok(Self { transfers })
    }

    pub fn from_wire(data: &WireData) -> Result<Self> {
        match data {
            WireData::CryptoTransfer(body) => Self::from_proto(body),
            _ => Err(Error::UnsupportedTransaction(
                "expected a crypto transfer body".into(),
            )),
        }
    }
}

impl TransactionData for TransferTransactionData {
    fn kind(&self) -> TransactionKind {
        TransactionKind::Transfer
    }

    fn method(&self) -> ServiceMethod {
        ServiceMethod::CryptoTransfer
    }

    fn to_wire_body(&self) -> WireData {
        WireData::CryptoTransfer(self.to_proto())
    }

    fn validate(&self) -> Result<()> {
        if self.transfers.is_empty() {
            return Err(Error::Validation("transfer list is empty".into()));
        }
        let net: i128 = self.transfers.iter().map(|t| i128::from(t.amount)).sum();
        if net != 0 {
            return Err(Error::Validation(format!(
                "transfers must net to zero, got {net}"
            )));
        }
        Ok(())
    }
}

impl TransactionBuilder<TransferTransactionData> {
    /// Credit (positive) or debit (negative) `account_id` by `amount` photons.
    pub fn nova_transfer(&mut self, account_id: AccountId, amount: i64) -> Result<&mut Self> {
        self.data_mut()?.add(account_id, amount, false)?;
        Ok(self)
    }

    /// Like [`Self::nova_transfer`], spending from an allowance.
    pub fn approved_nova_transfer(&mut self, account_id: AccountId, amount: i64) -> Result<&mut Self> {
        self.data_mut()?.add(account_id, amount, true)?;
        Ok(self)
    }

    pub fn get_transfers(&self) -> &[Transfer] {
        self.data().transfers()
    }
}
