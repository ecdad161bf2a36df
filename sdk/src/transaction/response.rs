//! What a successful submission hands back.

use crate::client::Client;
use crate::error::Result;
use crate::identity::{AccountId, TransactionId};
use crate::query::{TransactionReceipt, TransactionReceiptQuery, TransactionRecord, TransactionRecordQuery};

/// A node accepted the transaction. Whether the ledger *applied* it is a
/// question for the receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResponse {
    /// The node that accepted the submission.
    pub node_id: AccountId,
    pub transaction_id: TransactionId,
    /// SHA-384 of the signed-transaction bytes that node received.
    pub transaction_hash: Vec<u8>,
    /// Whether receipt lookups fail on a non-success status.
    pub validate_status: bool,
}

impl TransactionResponse {
    pub(crate) fn new(node_id: AccountId, transaction_id: TransactionId, transaction_hash: Vec<u8>) -> Self {
        Self {
            node_id,
            transaction_id,
            transaction_hash,
            validate_status: true,
        }
    }

    pub fn validate_status(mut self, validate: bool) -> Self {
        self.validate_status = validate;
        self
    }

    /// A receipt query pinned to the node that accepted the transaction.
    pub fn get_receipt_query(&self) -> TransactionReceiptQuery {
        TransactionReceiptQuery::new(self.transaction_id.clone())
            .node_account_ids([self.node_id.clone()])
            .validate_status(self.validate_status)
    }

    pub async fn get_receipt(&self, client: &Client) -> Result<TransactionReceipt> {
        self.get_receipt_query().execute(client).await
    }

    /// Wait for the receipt, then fetch the record from the same node.
    pub async fn get_record(&self, client: &Client) -> Result<TransactionRecord> {
        self.get_receipt(client).await?;
        TransactionRecordQuery::new(self.transaction_id.clone())
            .node_account_ids([self.node_id.clone()])
            .validate_status(self.validate_status)
            .execute(client)
            .await
    }
}
