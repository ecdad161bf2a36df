//! The immutable half: a frozen transaction.
//!
//! ```text
//!            freeze                 execute (≥1 signature)
//! Building ─────────▶ Frozen ──────────────────────────▶ Executed
//!                       │  ▲
//!                       └──┘ sign / add_signature
//! ```
//!
//! [`Transaction`] has no setters at all, so "mutate after freeze" can't be
//! written. What it still tracks at runtime:
//!
//! - the signature set, which may grow until the transaction is executed;
//! - the execution state. A frozen transaction is sent at most once: copies
//!   of it (clones, or the builder freezing again) share the state, so a
//!   second `execute` through any of them faults instead of risking a
//!   duplicate submission.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, info};

use super::data::{AnyTransactionData, TransactionData, TransactionKind};
use super::response::TransactionResponse;
use super::signing::SignatureSet;
use crate::client::Client;
use crate::codec;
use crate::crypto::{PrivateKey, PublicKey, Signer};
use crate::error::{Error, IllegalStateKind, Result};
use crate::execute::classify::classify_precheck;
use crate::execute::engine::{self, Execute};
use crate::execute::Verdict;
use crate::identity::{AccountId, TransactionId};
use crate::network::Channel;
use crate::proto::{self, Status};

const IDLE: u8 = 0;
const IN_FLIGHT: u8 = 1;
const EXECUTED: u8 = 2;

/// Execution state shared by every copy of one frozen transaction.
#[derive(Debug, Clone, Default)]
struct ExecutionState(Arc<AtomicU8>);

impl ExecutionState {
    fn is_executed(&self) -> bool {
        self.0.load(Ordering::Acquire) == EXECUTED
    }

    /// Claim the right to submit. Fails if another copy already submitted
    /// or is submitting right now. A submission that is dropped mid-flight
    /// keeps its claim, since it may already have reached a node.
    fn claim(&self) -> Result<()> {
        self.0
            .compare_exchange(IDLE, IN_FLIGHT, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| Error::IllegalState {
                kind: IllegalStateKind::Executed,
            })
    }

    fn finish(&self, submitted: bool) {
        self.0
            .store(if submitted { EXECUTED } else { IDLE }, Ordering::Release);
    }
}

/// A transaction of any kind, as decoded by [`Transaction::from_bytes`].
pub type AnyTransaction = Transaction<AnyTransactionData>;

/// A frozen transaction: identity, nodes and body bytes are fixed.
#[derive(Debug, Clone)]
pub struct Transaction<D> {
    data: D,
    transaction_id: TransactionId,
    node_account_ids: Vec<AccountId>,
    max_transaction_fee: u64,
    valid_duration: Duration,
    memo: String,
    /// One encoded body per node, same order as `node_account_ids`.
    body_bytes: Vec<Vec<u8>>,
    signatures: SignatureSet,
    state: ExecutionState,
}

impl<D: TransactionData> Transaction<D> {
    pub(crate) fn new(
        data: D,
        transaction_id: TransactionId,
        node_account_ids: Vec<AccountId>,
        max_transaction_fee: u64,
        valid_duration: Duration,
        memo: String,
    ) -> Self {
        let body_bytes = node_account_ids
            .iter()
            .map(|node| {
                codec::encode_body(&proto::TransactionBody {
                    transaction_id: Some(transaction_id.to_proto()),
                    node_account_id: Some(node.to_proto()),
                    transaction_fee: max_transaction_fee,
                    transaction_valid_duration: Some(proto::Duration {
                        seconds: valid_duration.as_secs() as i64,
                    }),
                    memo: memo.clone(),
                    data: Some(data.to_wire_body()),
                })
            })
            .collect();
        Self {
            data,
            transaction_id,
            node_account_ids,
            max_transaction_fee,
            valid_duration,
            memo,
            body_bytes,
            signatures: SignatureSet::new(),
            state: ExecutionState::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn kind(&self) -> TransactionKind {
        self.data.kind()
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn node_account_ids(&self) -> &[AccountId] {
        &self.node_account_ids
    }

    pub fn max_transaction_fee(&self) -> u64 {
        self.max_transaction_fee
    }

    pub fn transaction_valid_duration(&self) -> Duration {
        self.valid_duration
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    /// The canonical bytes signed for the node at `index`.
    pub fn body_bytes(&self, index: usize) -> Option<&[u8]> {
        self.body_bytes.get(index).map(Vec::as_slice)
    }

    /// Public keys that have signed, in signing order.
    pub fn signers(&self) -> impl Iterator<Item = &PublicKey> {
        self.signatures.public_keys()
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// `true` once this transaction, or any copy of it, was submitted.
    pub fn is_executed(&self) -> bool {
        self.state.is_executed()
    }

    pub(crate) fn log_id(&self) -> String {
        self.data.log_id(&self.transaction_id)
    }

    fn ensure_not_executed(&self) -> Result<()> {
        if self.state.is_executed() {
            return Err(Error::IllegalState {
                kind: IllegalStateKind::Executed,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Signing
    // -----------------------------------------------------------------------

    /// Sign every per-node body with a local key.
    pub fn sign(&mut self, key: &PrivateKey) -> Result<&mut Self> {
        let signatures = self.body_bytes.iter().map(|body| key.sign(body)).collect();
        self.add_signature(key.public_key(), signatures)
    }

    /// Sign every per-node body with any signer, possibly remote. The
    /// per-node requests run concurrently.
    pub async fn sign_with(&mut self, signer: &dyn Signer) -> Result<&mut Self> {
        self.ensure_not_executed()?;
        let signatures = try_join_all(self.body_bytes.iter().map(|body| signer.sign(body))).await?;
        self.add_signature(signer.public_key(), signatures)
    }

    /// Like [`Self::sign_with`], but first checks that `account_id` is the
    /// account paying for this transaction.
    pub async fn sign_as_payer(
        &mut self,
        account_id: &AccountId,
        signer: &dyn Signer,
    ) -> Result<&mut Self> {
        if *account_id != self.transaction_id.account_id {
            return Err(Error::PayerMismatch {
                expected: self.transaction_id.account_id.clone(),
                actual: account_id.clone(),
            });
        }
        self.sign_with(signer).await
    }

    /// Attach signatures made elsewhere: one per node, in node order. Each
    /// must verify against its body. A key that already signed has its
    /// signatures replaced.
    pub fn add_signature(
        &mut self,
        public_key: PublicKey,
        signatures: Vec<Vec<u8>>,
    ) -> Result<&mut Self> {
        self.ensure_not_executed()?;
        if signatures.len() != self.body_bytes.len() {
            return Err(Error::SignatureCount {
                expected: self.body_bytes.len(),
                actual: signatures.len(),
            });
        }
        for (index, (body, signature)) in self.body_bytes.iter().zip(&signatures).enumerate() {
            if !public_key.verify(body, signature) {
                return Err(Error::Validation(format!(
                    "signature from {public_key} does not verify for node {}",
                    self.node_account_ids[index]
                )));
            }
        }
        let added = self.signatures.insert(public_key, signatures);
        debug!(transaction = %self.log_id(), signer = %public_key, added, "signature collected");
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Wire form
    // -----------------------------------------------------------------------

    /// The signed envelope for the node at `index`.
    pub fn signed_transaction(&self, index: usize) -> Option<proto::Transaction> {
        let body = self.body_bytes.get(index)?;
        Some(codec::signed_transaction(body, &self.signatures.pairs_for(index)))
    }

    /// Serialize every per-node envelope, signatures included.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode_transaction_list(
            (0..self.body_bytes.len())
                .filter_map(|index| self.signed_transaction(index))
                .collect(),
        )
    }

    pub fn into_any(self) -> AnyTransaction
    where
        D: Into<AnyTransactionData>,
    {
        Transaction {
            data: self.data.into(),
            transaction_id: self.transaction_id,
            node_account_ids: self.node_account_ids,
            max_transaction_fee: self.max_transaction_fee,
            valid_duration: self.valid_duration,
            memo: self.memo,
            body_bytes: self.body_bytes,
            signatures: self.signatures,
            state: self.state,
        }
    }

    // -----------------------------------------------------------------------
    // Execute
    // -----------------------------------------------------------------------

    /// Submit to the network with the client's request timeout.
    pub async fn execute(&mut self, client: &Client) -> Result<TransactionResponse> {
        let timeout = client.settings().request_timeout;
        self.execute_with_timeout(client, timeout).await
    }

    /// Submit to the network, giving up after `timeout`.
    ///
    /// If the client operator is the payer and hasn't signed yet, it signs
    /// first. With no signatures at all this faults before anything is sent.
    pub async fn execute_with_timeout(
        &mut self,
        client: &Client,
        timeout: Duration,
    ) -> Result<TransactionResponse> {
        self.ensure_not_executed()?;

        if let Some(operator) = client.operator() {
            if operator.account_id == self.transaction_id.account_id
                && !self.signatures.contains(&operator.signer.public_key())
            {
                self.sign_with(operator.signer.as_ref()).await?;
            }
        }
        if self.signatures.is_empty() {
            return Err(Error::NoSignatures {
                transaction_id: self.transaction_id.clone(),
            });
        }

        self.state.claim()?;
        let result = engine::execute(client.network(), &*self, &client.request_policy(), timeout).await;
        self.state.finish(result.is_ok());
        let response = result?;
        info!(
            transaction = %self.log_id(),
            node = %response.node_id,
            hash = %hex::encode(&response.transaction_hash),
            "transaction submitted"
        );
        Ok(response)
    }
}

impl AnyTransaction {
    /// Decode bytes written by [`Transaction::to_bytes`].
    ///
    /// Every per-node body must describe the same transaction, differing
    /// only in the node account id, and no node may appear twice. Body bytes
    /// are kept exactly as decoded, so existing signatures stay valid; each
    /// one is checked the same way [`Self::add_signature`] checks it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = codec::decode_transaction_list(bytes)?;

        let mut node_account_ids = Vec::with_capacity(decoded.len());
        for entry in &decoded {
            let node = entry
                .body
                .node_account_id
                .as_ref()
                .ok_or_else(|| Error::Validation("body has no node account id".into()))?;
            let node = AccountId::from_proto(node)?;
            if node_account_ids.contains(&node) {
                return Err(Error::Validation(format!("node {node} is listed twice")));
            }
            node_account_ids.push(node);
        }

        let first = &decoded[0].body;
        let shared = |body: &proto::TransactionBody| proto::TransactionBody {
            node_account_id: None,
            ..body.clone()
        };
        let reference = shared(first);
        if decoded.iter().any(|entry| shared(&entry.body) != reference) {
            return Err(Error::Validation(
                "per-node bodies describe different transactions".into(),
            ));
        }

        let transaction_id = first
            .transaction_id
            .as_ref()
            .ok_or_else(|| Error::Validation("body has no transaction id".into()))?;
        let transaction_id = TransactionId::from_proto(transaction_id)?;
        let data = AnyTransactionData::from_wire(first.data.as_ref())?;
        let valid_duration = Duration::from_secs(
            first
                .transaction_valid_duration
                .as_ref()
                .map(|d| d.seconds.max(0) as u64)
                .unwrap_or_default(),
        );

        let mut signers: Vec<PublicKey> = Vec::new();
        let mut seen = HashSet::new();
        for pair in decoded.iter().flat_map(|entry| &entry.signatures) {
            if seen.insert(pair.public_key) {
                signers.push(pair.public_key);
            }
        }
        let per_signer: Vec<(PublicKey, Vec<Vec<u8>>)> = signers
            .into_iter()
            .map(|public_key| {
                let per_node: Vec<Vec<u8>> = decoded
                    .iter()
                    .filter_map(|entry| {
                        entry
                            .signatures
                            .iter()
                            .find(|pair| pair.public_key == public_key)
                            .map(|pair| pair.signature.clone())
                    })
                    .collect();
                (public_key, per_node)
            })
            .collect();

        let mut transaction = Self {
            data,
            transaction_id,
            node_account_ids,
            max_transaction_fee: first.transaction_fee,
            valid_duration,
            memo: first.memo.clone(),
            body_bytes: decoded.into_iter().map(|entry| entry.body_bytes).collect(),
            signatures: SignatureSet::new(),
            state: ExecutionState::default(),
        };
        for (public_key, per_node) in per_signer {
            transaction.add_signature(public_key, per_node)?;
        }
        Ok(transaction)
    }
}

#[async_trait]
impl<D: TransactionData> Execute for Transaction<D> {
    type Request = proto::Transaction;
    type Response = proto::TransactionResponse;
    type Output = TransactionResponse;

    fn node_account_ids(&self) -> &[AccountId] {
        &self.node_account_ids
    }

    fn transaction_id(&self) -> Option<&TransactionId> {
        Some(&self.transaction_id)
    }

    fn log_id(&self) -> String {
        self.data.log_id(&self.transaction_id)
    }

    fn make_request(&self, node: &AccountId) -> Result<Self::Request> {
        let index = self
            .node_account_ids
            .iter()
            .position(|n| n == node)
            .ok_or_else(|| Error::UnknownNode(node.clone()))?;
        self.signed_transaction(index)
            .ok_or_else(|| Error::UnknownNode(node.clone()))
    }

    async fn send(
        &self,
        channel: &dyn Channel,
        request: Self::Request,
    ) -> std::result::Result<Self::Response, tonic::Status> {
        self.data.execute_on(channel, request).await
    }

    fn classify(&self, response: &Self::Response) -> (Status, Verdict) {
        let status = Status::from_code(response.node_transaction_precheck_code);
        (status, classify_precheck(status))
    }

    fn make_output(
        &self,
        _response: Self::Response,
        request: &Self::Request,
        node: &AccountId,
    ) -> Result<Self::Output> {
        Ok(TransactionResponse::new(
            node.clone(),
            self.transaction_id.clone(),
            codec::transaction_hash(request),
        ))
    }
}
