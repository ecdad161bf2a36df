//! Record lookup: the receipt plus what the transaction cost and moved.

use super::{classify_lookup, Query, QueryData, TransactionReceipt};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::execute::{RetryPolicy, Verdict};
use crate::identity::{AccountId, Timestamp, TransactionId};
use crate::network::ServiceMethod;
use crate::proto::{self, Status};
use crate::transaction::Transfer;

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub receipt: TransactionReceipt,
    /// SHA-384 of the signed transaction, as the ledger saw it.
    pub transaction_hash: Vec<u8>,
    pub consensus_timestamp: Option<Timestamp>,
    pub transaction_id: TransactionId,
    pub memo: String,
    /// Fee actually charged, in photons.
    pub transaction_fee: u64,
    /// Every balance change, fees included.
    pub transfers: Vec<Transfer>,
}

impl TransactionRecord {
    fn from_proto(pb: &proto::TransactionRecord, requested: &TransactionId) -> Result<Self> {
        let transaction_id = match &pb.transaction_id {
            Some(id) => TransactionId::from_proto(id)?,
            None => requested.clone(),
        };
        let receipt = pb
            .receipt
            .as_ref()
            .ok_or(Error::MalformedResponse("record without receipt"))?;
        let transfers = pb
            .transfer_list
            .iter()
            .flat_map(|list| &list.account_amounts)
            .map(|aa| -> Result<Transfer> {
                let account = aa
                    .account_id
                    .as_ref()
                    .ok_or(Error::MalformedResponse("record transfer without account"))?;
                Ok(Transfer {
                    account_id: AccountId::from_proto(account)?,
                    amount: aa.amount,
                    is_approval: aa.is_approval,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            receipt: TransactionReceipt::from_proto(receipt, Some(transaction_id.clone()))?,
            transaction_hash: pb.transaction_hash.clone(),
            consensus_timestamp: pb.consensus_timestamp.as_ref().map(Timestamp::from_proto),
            transaction_id,
            memo: pb.memo.clone(),
            transaction_fee: pb.transaction_fee,
            transfers,
        })
    }
}

/// Fetches a transaction's record. Paid: the operator covers the query fee.
pub type TransactionRecordQuery = Query<TransactionRecordQueryData>;

#[derive(Debug, Clone)]
pub struct TransactionRecordQueryData {
    transaction_id: TransactionId,
    include_children: bool,
    include_duplicates: bool,
    validate_status: bool,
}

impl Query<TransactionRecordQueryData> {
    pub fn new(transaction_id: TransactionId) -> Self {
        Self::from_data(TransactionRecordQueryData {
            transaction_id,
            include_children: false,
            include_duplicates: false,
            validate_status: true,
        })
    }

    pub fn include_children(mut self, include: bool) -> Self {
        self.data.include_children = include;
        self
    }

    pub fn include_duplicates(mut self, include: bool) -> Self {
        self.data.include_duplicates = include;
        self
    }

    /// With `false`, the record of a failed transaction is returned instead
    /// of raised.
    pub fn validate_status(mut self, validate: bool) -> Self {
        self.data.validate_status = validate;
        self
    }
}

impl QueryData for TransactionRecordQueryData {
    type Output = TransactionRecord;

    fn method(&self) -> ServiceMethod {
        ServiceMethod::GetTxRecordByTxId
    }

    fn transaction_id(&self) -> Option<&TransactionId> {
        Some(&self.transaction_id)
    }

    fn to_query(&self, header: proto::QueryHeader) -> proto::Query {
        proto::Query {
            query: Some(proto::query::Query::TransactionGetRecord(
                proto::TransactionGetRecordQuery {
                    header: Some(header),
                    transaction_id: Some(self.transaction_id.to_proto()),
                    include_duplicates: self.include_duplicates,
                    include_child_records: self.include_children,
                },
            )),
        }
    }

    fn classify(&self, response: &proto::Response) -> (Status, Verdict) {
        match &response.response {
            Some(proto::response::Response::TransactionGetRecord(r)) => classify_lookup(
                r.header.as_ref(),
                r.transaction_record.as_ref().and_then(|rec| rec.receipt.as_ref()),
            ),
            _ => (Status::Ok, Verdict::Accepted),
        }
    }

    fn make_output(&self, response: proto::Response) -> Result<TransactionRecord> {
        let Some(proto::response::Response::TransactionGetRecord(r)) = response.response else {
            return Err(Error::MalformedResponse("expected a record response"));
        };
        let pb = r
            .transaction_record
            .as_ref()
            .ok_or(Error::MalformedResponse("record response without record"))?;
        let record = TransactionRecord::from_proto(pb, &self.transaction_id)?;
        if self.validate_status {
            record.receipt.validate_status()?;
        }
        Ok(record)
    }

    fn retry_policy(&self, client: &Client) -> RetryPolicy {
        client.receipt_policy()
    }

    fn timeout(&self, client: &Client) -> std::time::Duration {
        client.settings().receipt_timeout
    }

    fn log_id(&self) -> String {
        format!("TransactionRecordQuery:{}", self.transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx_id() -> TransactionId {
        TransactionId::new(AccountId::new(0, 0, 1001), Timestamp::new(1_700_000_000, 0))
    }

    fn record_response(status: Status) -> proto::Response {
        proto::Response {
            response: Some(proto::response::Response::TransactionGetRecord(
                proto::TransactionGetRecordResponse {
                    header: Some(proto::ResponseHeader::default()),
                    transaction_record: Some(proto::TransactionRecord {
                        receipt: Some(proto::TransactionReceipt {
                            status: status as i32,
                            ..Default::default()
                        }),
                        transaction_hash: vec![7; 48],
                        consensus_timestamp: Some(proto::Timestamp {
                            seconds: 1_700_000_003,
                            nanos: 1,
                        }),
                        transaction_id: Some(tx_id().to_proto()),
                        memo: "lunch".into(),
                        transaction_fee: 84_000,
                        transfer_list: Some(proto::TransferList {
                            account_amounts: vec![
                                proto::AccountAmount {
                                    account_id: Some(AccountId::new(0, 0, 1001).to_proto()),
                                    amount: -84_100,
                                    is_approval: false,
                                },
                                proto::AccountAmount {
                                    account_id: Some(AccountId::new(0, 0, 1002).to_proto()),
                                    amount: 100,
                                    is_approval: false,
                                },
                            ],
                        }),
                    }),
                },
            )),
        }
    }

    #[test]
    fn record_decodes() {
        let query = TransactionRecordQuery::new(tx_id());
        let record = query.data().make_output(record_response(Status::Success)).unwrap();
        assert_eq!(record.transaction_id, tx_id());
        assert_eq!(record.memo, "lunch");
        assert_eq!(record.transaction_fee, 84_000);
        assert_eq!(record.transfers.len(), 2);
        assert_eq!(record.consensus_timestamp, Some(Timestamp::new(1_700_000_003, 1)));
        assert!(record.receipt.is_success());
    }

    #[test]
    fn record_query_is_paid() {
        assert!(TransactionRecordQuery::new(tx_id()).data().is_payment_required());
    }

    #[test]
    fn failed_record_respects_validate_flag() {
        let query = TransactionRecordQuery::new(tx_id());
        assert!(query
            .data()
            .make_output(record_response(Status::InsufficientPayerBalance))
            .is_err());

        let query = TransactionRecordQuery::new(tx_id()).validate_status(false);
        let record = query
            .data()
            .make_output(record_response(Status::InsufficientPayerBalance))
            .unwrap();
        assert_eq!(record.receipt.status, Status::InsufficientPayerBalance);
    }

    #[test]
    fn pending_record_is_retried() {
        let query = TransactionRecordQuery::new(tx_id());
        let (_, verdict) = query.data().classify(&record_response(Status::Unknown));
        assert_eq!(verdict, Verdict::RequestTransient);
    }
}
