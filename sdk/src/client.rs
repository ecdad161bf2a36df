//! # Client
//!
//! The handle every request is executed through. A [`Client`] owns:
//!
//! - the [`Network`] map (shared, health included),
//! - the optional **operator**: default payer and automatic signer,
//! - the [`ClientSettings`] applied to requests that don't override them.
//!
//! Cloning a client is cheap and clones share everything, node health
//! included. That's the point: two tasks hammering the same ledger should
//! agree on which nodes are having a bad day.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::info;

use crate::config::{ClientConfig, ClientSettings, LedgerId};
use crate::crypto::{PrivateKey, Signer};
use crate::error::{Error, Result};
use crate::execute::RetryPolicy;
use crate::identity::AccountId;
use crate::network::Network;

/// Default payer and signer for requests executed through a client.
#[derive(Clone)]
pub struct Operator {
    pub account_id: AccountId,
    pub signer: Arc<dyn Signer>,
}

impl std::fmt::Debug for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operator")
            .field("account_id", &self.account_id)
            .field("public_key", &self.signer.public_key())
            .finish()
    }
}

struct ClientInner {
    network: Network,
    operator: RwLock<Option<Operator>>,
    settings: RwLock<ClientSettings>,
}

/// Entry point for talking to a NOVA ledger.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("network", &self.inner.network)
            .field("operator", &*self.inner.operator.read())
            .finish()
    }
}

impl Client {
    /// A client over an address book of `address → node account id`.
    ///
    /// Channels connect lazily; must be called from within a tokio runtime.
    pub fn for_network(address_book: HashMap<String, AccountId>) -> Result<Self> {
        Ok(Self::with_network(Network::from_address_book(address_book)?))
    }

    /// A client over a prebuilt network map.
    pub fn with_network(network: Network) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                network,
                operator: RwLock::new(None),
                settings: RwLock::new(ClientSettings::default()),
            }),
        }
    }

    /// A client from a parsed [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let settings = config.settings()?;

        let mut book = Vec::with_capacity(config.network.len());
        for (address, node) in &config.network {
            book.push((address.clone(), node.parse::<AccountId>()?));
        }
        let mut network = Network::from_address_book(book)?;
        if let Some(ledger_id) = &config.ledger_id {
            network = network.with_ledger_id(ledger_id.clone());
        }

        let client = Self::with_network(network);
        *client.inner.settings.write() = settings;

        if let Some(operator) = &config.operator {
            let account_id: AccountId = operator.account_id.parse()?;
            let key = PrivateKey::from_hex(&operator.private_key)?;
            client.set_operator(account_id, key);
        }

        info!(
            nodes = client.network().len(),
            ledger = ?client.ledger_id(),
            "client configured"
        );
        Ok(client)
    }

    /// Parse a JSON config document and build a client from it.
    pub fn from_config_json(json: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::from_json(json)?)
    }

    // -----------------------------------------------------------------------
    // Operator
    // -----------------------------------------------------------------------

    /// Pay for and sign requests as `account_id` with a local key.
    pub fn set_operator(&self, account_id: AccountId, key: PrivateKey) -> &Self {
        self.set_operator_with(account_id, Arc::new(key))
    }

    /// Pay for and sign requests as `account_id` with any signer.
    pub fn set_operator_with(&self, account_id: AccountId, signer: Arc<dyn Signer>) -> &Self {
        *self.inner.operator.write() = Some(Operator { account_id, signer });
        self
    }

    pub fn operator(&self) -> Option<Operator> {
        self.inner.operator.read().clone()
    }

    pub fn operator_account_id(&self) -> Option<AccountId> {
        self.inner
            .operator
            .read()
            .as_ref()
            .map(|op| op.account_id.clone())
    }

    pub(crate) fn require_operator(&self) -> Result<Operator> {
        self.operator().ok_or(Error::NoOperator)
    }

    // -----------------------------------------------------------------------
    // Network & settings
    // -----------------------------------------------------------------------

    pub fn network(&self) -> &Network {
        &self.inner.network
    }

    pub fn ledger_id(&self) -> Option<LedgerId> {
        self.inner.network.ledger_id().cloned()
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> ClientSettings {
        self.inner.settings.read().clone()
    }

    pub fn set_max_attempts(&self, attempts: u32) -> &Self {
        self.inner.settings.write().max_attempts = attempts.max(1);
        self
    }

    pub fn set_backoff(&self, min: Duration, max: Duration) -> &Self {
        let mut settings = self.inner.settings.write();
        settings.min_backoff = min.min(max);
        settings.max_backoff = max;
        self
    }

    pub fn set_request_timeout(&self, timeout: Duration) -> &Self {
        self.inner.settings.write().request_timeout = timeout;
        self
    }

    pub fn set_receipt_timeout(&self, timeout: Duration) -> &Self {
        self.inner.settings.write().receipt_timeout = timeout;
        self
    }

    pub fn set_default_max_transaction_fee(&self, fee: u64) -> &Self {
        self.inner.settings.write().default_max_transaction_fee = Some(fee);
        self
    }

    pub fn set_max_query_payment(&self, payment: u64) -> &Self {
        self.inner.settings.write().max_query_payment = payment;
        self
    }

    pub fn set_default_query_payment(&self, payment: u64) -> &Self {
        self.inner.settings.write().default_query_payment = payment;
        self
    }

    pub fn set_transaction_valid_duration(&self, duration: Duration) -> &Self {
        self.inner.settings.write().transaction_valid_duration = duration;
        self
    }

    pub fn set_max_nodes_per_transaction(&self, count: usize) -> &Self {
        self.inner.settings.write().max_nodes_per_transaction = Some(count.max(1));
        self
    }

    /// Nodes pinned at freeze when the caller doesn't choose: the configured
    /// count, or a third of the network, and never less than one.
    pub fn max_nodes_per_transaction(&self) -> usize {
        let n = self.inner.network.len();
        self.inner
            .settings
            .read()
            .max_nodes_per_transaction
            .unwrap_or_else(|| n.div_ceil(3))
            .clamp(1, n.max(1))
    }

    pub(crate) fn request_policy(&self) -> RetryPolicy {
        RetryPolicy::for_requests(&self.inner.settings.read())
    }

    pub(crate) fn receipt_policy(&self) -> RetryPolicy {
        RetryPolicy::for_receipts(&self.inner.settings.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Channel;
    use crate::proto;
    use async_trait::async_trait;

    struct Idle;

    #[async_trait]
    impl Channel for Idle {
        async fn submit_transaction(
            &self,
            _: crate::network::ServiceMethod,
            _: proto::Transaction,
        ) -> std::result::Result<proto::TransactionResponse, tonic::Status> {
            Err(tonic::Status::unimplemented("idle"))
        }

        async fn submit_query(
            &self,
            _: crate::network::ServiceMethod,
            _: proto::Query,
        ) -> std::result::Result<proto::Response, tonic::Status> {
            Err(tonic::Status::unimplemented("idle"))
        }
    }

    fn client(nodes: u64) -> Client {
        let network = Network::from_channels(
            (0..nodes).map(|i| (AccountId::new(0, 0, 3 + i), Arc::new(Idle) as Arc<dyn Channel>)),
        )
        .unwrap();
        Client::with_network(network)
    }

    #[test]
    fn default_node_count_is_a_third_of_the_network() {
        assert_eq!(client(1).max_nodes_per_transaction(), 1);
        assert_eq!(client(3).max_nodes_per_transaction(), 1);
        assert_eq!(client(4).max_nodes_per_transaction(), 2);
        assert_eq!(client(9).max_nodes_per_transaction(), 3);
    }

    #[test]
    fn explicit_node_count_is_clamped_to_network() {
        let c = client(2);
        c.set_max_nodes_per_transaction(10);
        assert_eq!(c.max_nodes_per_transaction(), 2);
    }

    #[test]
    fn operator_roundtrip() {
        let c = client(1);
        assert!(c.operator().is_none());
        assert!(matches!(c.require_operator(), Err(Error::NoOperator)));

        let key = PrivateKey::generate();
        let pk = key.public_key();
        c.set_operator(AccountId::new(0, 0, 1001), key);
        let op = c.operator().unwrap();
        assert_eq!(op.account_id, AccountId::new(0, 0, 1001));
        assert_eq!(op.signer.public_key(), pk);
    }

    #[test]
    fn clones_share_settings() {
        let a = client(1);
        let b = a.clone();
        a.set_max_attempts(3);
        assert_eq!(b.settings().max_attempts, 3);
    }

    #[tokio::test]
    async fn from_config_json_builds_client() {
        let key = PrivateKey::generate();
        let json = format!(
            r#"{{
                "network": {{ "127.0.0.1:50211": "0.0.3", "127.0.0.1:50212": "0.0.4" }},
                "ledgerId": "previewnet",
                "operator": {{ "accountId": "0.0.1001", "privateKey": "{}" }},
                "maxAttempts": 3
            }}"#,
            key.to_hex()
        );
        let c = Client::from_config_json(&json).unwrap();
        assert_eq!(c.network().len(), 2);
        assert_eq!(c.ledger_id(), Some(LedgerId::Previewnet));
        assert_eq!(c.operator_account_id(), Some(AccountId::new(0, 0, 1001)));
        assert_eq!(c.settings().max_attempts, 3);
    }

    #[tokio::test]
    async fn from_config_rejects_bad_node_id() {
        let json = r#"{ "network": { "127.0.0.1:50211": "zero.zero.three" } }"#;
        assert!(matches!(
            Client::from_config_json(json),
            Err(Error::Parse(_))
        ));
    }
}
