//! # Queries
//!
//! Receipt and record lookups, sent through the same engine as
//! transactions. A query differs from a transaction in three ways:
//!
//! 1. It is built per node on demand, never frozen or signed by the caller.
//! 2. Paid queries carry a payment: a tiny operator-signed transfer to the
//!    node answering. One payment is prepared per candidate node up front.
//! 3. "Not there yet" answers (receipt not found, status unknown) are
//!    retried against the same node instead of failing.

mod receipt;
mod record;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

pub use receipt::{
    ExchangeRate, ExchangeRates, ScheduleId, TransactionReceipt, TransactionReceiptQuery,
    TransactionReceiptQueryData,
};
pub use record::{TransactionRecord, TransactionRecordQuery, TransactionRecordQueryData};

use crate::client::Client;
use crate::config::format_nova;
use crate::error::{Error, Result};
use crate::execute::classify::{classify_lookup_precheck, classify_receipt_status};
use crate::execute::engine::{self, Execute};
use crate::execute::{RetryPolicy, Verdict};
use crate::identity::{AccountId, TransactionId};
use crate::network::{Channel, ServiceMethod};
use crate::proto::{self, Status};
use crate::transaction::TransferTransaction;

// ---------------------------------------------------------------------------
// QueryData
// ---------------------------------------------------------------------------

/// What a query kind contributes to the shared query path.
#[async_trait]
pub trait QueryData: Clone + fmt::Debug + Send + Sync + 'static {
    type Output: Send;

    fn method(&self) -> ServiceMethod;

    /// The transaction the query is about, if any.
    fn transaction_id(&self) -> Option<&TransactionId>;

    fn is_payment_required(&self) -> bool {
        true
    }

    /// Wrap the kind-specific request around `header`.
    fn to_query(&self, header: proto::QueryHeader) -> proto::Query;

    /// Status the node reported, and what to do about it.
    fn classify(&self, response: &proto::Response) -> (Status, Verdict);

    fn make_output(&self, response: proto::Response) -> Result<Self::Output>;

    fn retry_policy(&self, client: &Client) -> RetryPolicy {
        client.request_policy()
    }

    fn timeout(&self, client: &Client) -> Duration {
        client.settings().request_timeout
    }

    fn log_id(&self) -> String;

    async fn execute_on(
        &self,
        channel: &dyn Channel,
        request: proto::Query,
    ) -> std::result::Result<proto::Response, tonic::Status> {
        channel.submit_query(self.method(), request).await
    }
}

/// Shared classification for receipt-bearing lookups: precheck first, then
/// the receipt status if the node had one.
pub(crate) fn classify_lookup(
    header: Option<&proto::ResponseHeader>,
    receipt: Option<&proto::TransactionReceipt>,
) -> (Status, Verdict) {
    let precheck = Status::from_code(header.map_or(0, |h| h.node_transaction_precheck_code));
    match classify_lookup_precheck(precheck) {
        Verdict::Accepted => {
            let status = Status::from_code(receipt.map_or(Status::Unknown as i32, |r| r.status));
            (status, classify_receipt_status(status))
        }
        verdict => (precheck, verdict),
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A query of kind `D`, with optional node pinning and payment overrides.
#[derive(Debug, Clone)]
pub struct Query<D> {
    data: D,
    node_account_ids: Option<Vec<AccountId>>,
    payment_amount: Option<u64>,
    max_query_payment: Option<u64>,
}

impl<D: QueryData> Query<D> {
    pub(crate) fn from_data(data: D) -> Self {
        Self {
            data,
            node_account_ids: None,
            payment_amount: None,
            max_query_payment: None,
        }
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    /// Only ask these nodes.
    pub fn node_account_ids(mut self, nodes: impl IntoIterator<Item = AccountId>) -> Self {
        self.node_account_ids = Some(nodes.into_iter().collect());
        self
    }

    /// Pay exactly this much per node asked (paid queries only).
    pub fn payment_amount(mut self, amount: u64) -> Self {
        self.payment_amount = Some(amount);
        self
    }

    /// Refuse to pay more than this.
    pub fn max_query_payment(mut self, max: u64) -> Self {
        self.max_query_payment = Some(max);
        self
    }

    pub async fn execute(&self, client: &Client) -> Result<D::Output> {
        self.execute_with_timeout(client, self.data.timeout(client)).await
    }

    pub async fn execute_with_timeout(&self, client: &Client, timeout: Duration) -> Result<D::Output> {
        let nodes = match &self.node_account_ids {
            Some(nodes) => nodes.clone(),
            None => client
                .network()
                .select(&HashSet::new(), client.max_nodes_per_transaction()),
        };
        if nodes.is_empty() {
            return Err(Error::EmptyNetwork);
        }

        let payments = if self.data.is_payment_required() {
            self.prepare_payments(client, &nodes).await?
        } else {
            HashMap::new()
        };

        let execution = QueryExecution {
            data: &self.data,
            nodes,
            payments,
        };
        engine::execute(
            client.network(),
            &execution,
            &self.data.retry_policy(client),
            timeout,
        )
        .await
    }

    /// One signed operator → node transfer per candidate node.
    async fn prepare_payments(
        &self,
        client: &Client,
        nodes: &[AccountId],
    ) -> Result<HashMap<AccountId, proto::Transaction>> {
        let operator = client.require_operator()?;
        let settings = client.settings();
        let amount = self.payment_amount.unwrap_or(settings.default_query_payment);
        let max = self.max_query_payment.unwrap_or(settings.max_query_payment);
        if amount > max {
            return Err(Error::QueryPaymentTooHigh {
                payment: amount,
                max,
            });
        }
        let signed_amount = i64::try_from(amount)
            .map_err(|_| Error::Validation(format!("query payment {amount} is out of range")))?;

        let mut payments = HashMap::with_capacity(nodes.len());
        for node in nodes {
            let mut payment = TransferTransaction::new();
            payment
                .nova_transfer(operator.account_id.clone(), -signed_amount)?
                .nova_transfer(node.clone(), signed_amount)?
                .transaction_id(TransactionId::generate(operator.account_id.clone()))?
                .node_account_ids([node.clone()])?;
            let mut frozen = payment.freeze()?;
            frozen.sign_with(operator.signer.as_ref()).await?;
            let envelope = frozen
                .signed_transaction(0)
                .ok_or_else(|| Error::Validation("payment has no body".into()))?;
            payments.insert(node.clone(), envelope);
        }
        debug!(
            query = %self.data.log_id(),
            nodes = nodes.len(),
            amount = %format_nova(amount),
            "query payments prepared"
        );
        Ok(payments)
    }
}

/// One run of a query through the engine.
struct QueryExecution<'a, D> {
    data: &'a D,
    nodes: Vec<AccountId>,
    payments: HashMap<AccountId, proto::Transaction>,
}

#[async_trait]
impl<'a, D: QueryData> Execute for QueryExecution<'a, D> {
    type Request = proto::Query;
    type Response = proto::Response;
    type Output = D::Output;

    fn node_account_ids(&self) -> &[AccountId] {
        &self.nodes
    }

    fn transaction_id(&self) -> Option<&TransactionId> {
        self.data.transaction_id()
    }

    fn log_id(&self) -> String {
        self.data.log_id()
    }

    fn make_request(&self, node: &AccountId) -> Result<Self::Request> {
        let header = proto::QueryHeader {
            payment: self.payments.get(node).cloned(),
            response_type: proto::ResponseType::AnswerOnly as i32,
        };
        Ok(self.data.to_query(header))
    }

    async fn send(
        &self,
        channel: &dyn Channel,
        request: Self::Request,
    ) -> std::result::Result<Self::Response, tonic::Status> {
        self.data.execute_on(channel, request).await
    }

    fn classify(&self, response: &Self::Response) -> (Status, Verdict) {
        self.data.classify(response)
    }

    fn make_output(
        &self,
        response: Self::Response,
        _request: &Self::Request,
        _node: &AccountId,
    ) -> Result<Self::Output> {
        self.data.make_output(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(status: Status) -> proto::ResponseHeader {
        proto::ResponseHeader {
            node_transaction_precheck_code: status as i32,
            ..Default::default()
        }
    }

    fn receipt(status: Status) -> proto::TransactionReceipt {
        proto::TransactionReceipt {
            status: status as i32,
            ..Default::default()
        }
    }

    #[test]
    fn lookup_precheck_wins_over_receipt() {
        let (status, verdict) =
            classify_lookup(Some(&header(Status::Busy)), Some(&receipt(Status::Success)));
        assert_eq!(status, Status::Busy);
        assert_eq!(verdict, Verdict::NodeTransient);
    }

    #[test]
    fn pending_receipt_is_retried_on_the_same_node() {
        let (status, verdict) =
            classify_lookup(Some(&header(Status::Ok)), Some(&receipt(Status::Unknown)));
        assert_eq!(status, Status::Unknown);
        assert_eq!(verdict, Verdict::RequestTransient);
    }

    #[test]
    fn missing_receipt_counts_as_pending() {
        let (status, verdict) = classify_lookup(Some(&header(Status::Ok)), None);
        assert_eq!(status, Status::Unknown);
        assert_eq!(verdict, Verdict::RequestTransient);
    }

    #[test]
    fn final_receipt_statuses_are_accepted() {
        for final_status in [Status::Success, Status::InvalidAccountId, Status::InsufficientPayerBalance] {
            let (status, verdict) =
                classify_lookup(Some(&header(Status::Ok)), Some(&receipt(final_status)));
            assert_eq!(status, final_status);
            assert_eq!(verdict, Verdict::Accepted);
        }
    }
}
