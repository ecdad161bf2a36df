//! The mutable half of the builder/value split.
//!
//! A [`TransactionBuilder`] collects fields. Freezing it binds the
//! transaction id and node list, encodes one body per node, and hands back
//! an immutable [`Transaction`]. From then on the builder refuses every
//! mutation with [`Error::IllegalState`], so a caller can't change a field
//! and be surprised that the already-signed bytes didn't follow.

use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;

use super::data::TransactionData;
use super::lifecycle::Transaction;
use crate::client::Client;
use crate::config::{DEFAULT_TRANSACTION_VALID_DURATION, MAX_MEMO_LENGTH, MAX_TRANSACTION_VALID_DURATION};
use crate::error::{Error, IllegalStateKind, Result};
use crate::identity::{AccountId, TransactionId};

/// A transaction still being put together.
#[derive(Debug, Clone)]
pub struct TransactionBuilder<D: TransactionData> {
    data: D,
    transaction_id: Option<TransactionId>,
    node_account_ids: Option<Vec<AccountId>>,
    max_transaction_fee: Option<u64>,
    valid_duration: Option<Duration>,
    memo: String,
    frozen: Option<Transaction<D>>,
}

impl<D: TransactionData + Default> Default for TransactionBuilder<D> {
    fn default() -> Self {
        Self::from_data(D::default())
    }
}

impl<D: TransactionData + Default> TransactionBuilder<D> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: TransactionData> TransactionBuilder<D> {
    pub fn from_data(data: D) -> Self {
        Self {
            data,
            transaction_id: None,
            node_account_ids: None,
            max_transaction_fee: None,
            valid_duration: None,
            memo: String::new(),
            frozen: None,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    fn ensure_building(&self) -> Result<()> {
        if self.is_frozen() {
            return Err(Error::IllegalState {
                kind: IllegalStateKind::Frozen,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Setters
    // -----------------------------------------------------------------------

    /// Use an explicit transaction id instead of generating one at freeze.
    pub fn transaction_id(&mut self, id: TransactionId) -> Result<&mut Self> {
        self.ensure_building()?;
        self.transaction_id = Some(id);
        Ok(self)
    }

    /// Pin the nodes this transaction may be sent to.
    pub fn node_account_ids(&mut self, nodes: impl IntoIterator<Item = AccountId>) -> Result<&mut Self> {
        self.ensure_building()?;
        self.node_account_ids = Some(nodes.into_iter().collect());
        Ok(self)
    }

    pub fn max_transaction_fee(&mut self, fee: u64) -> Result<&mut Self> {
        self.ensure_building()?;
        self.max_transaction_fee = Some(fee);
        Ok(self)
    }

    pub fn transaction_valid_duration(&mut self, duration: Duration) -> Result<&mut Self> {
        self.ensure_building()?;
        self.valid_duration = Some(duration);
        Ok(self)
    }

    pub fn memo(&mut self, memo: impl Into<String>) -> Result<&mut Self> {
        self.ensure_building()?;
        self.memo = memo.into();
        Ok(self)
    }

    /// Kind-specific data, for kind setters.
    pub(crate) fn data_mut(&mut self) -> Result<&mut D> {
        self.ensure_building()?;
        Ok(&mut self.data)
    }

    // -----------------------------------------------------------------------
    // Getters
    // -----------------------------------------------------------------------

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn get_transaction_id(&self) -> Option<&TransactionId> {
        self.transaction_id.as_ref()
    }

    pub fn get_node_account_ids(&self) -> Option<&[AccountId]> {
        self.node_account_ids.as_deref()
    }

    pub fn get_max_transaction_fee(&self) -> Option<u64> {
        self.max_transaction_fee
    }

    pub fn get_transaction_valid_duration(&self) -> Option<Duration> {
        self.valid_duration
    }

    pub fn get_memo(&self) -> &str {
        &self.memo
    }

    // -----------------------------------------------------------------------
    // Freeze
    // -----------------------------------------------------------------------

    /// Freeze using the client for whatever wasn't set explicitly: the
    /// operator pays (a fresh id is generated), the network map picks the
    /// nodes, and client defaults fill in fee and validity window.
    ///
    /// Freezing again returns the same frozen transaction, as long as the
    /// client's network still contains every node it was bound to. The copy
    /// shares the original's execution state, so it can't be sent twice.
    pub fn freeze_with(&mut self, client: &Client) -> Result<Transaction<D>> {
        if let Some(frozen) = &self.frozen {
            let network = client.network();
            if let Some(node) = frozen.node_account_ids().iter().find(|n| !network.contains(n)) {
                return Err(Error::FreezeConflict { node: node.clone() });
            }
            return Ok(frozen.clone());
        }

        let transaction_id = match &self.transaction_id {
            Some(id) => id.clone(),
            None => TransactionId::generate(client.require_operator()?.account_id),
        };

        let node_account_ids = match &self.node_account_ids {
            Some(nodes) => {
                if let Some(unknown) = nodes.iter().find(|n| !client.network().contains(n)) {
                    return Err(Error::UnknownNode(unknown.clone()));
                }
                nodes.clone()
            }
            None => client
                .network()
                .select(&HashSet::new(), client.max_nodes_per_transaction()),
        };
        if node_account_ids.is_empty() {
            return Err(Error::EmptyNetwork);
        }

        let settings = client.settings();
        let fee = self
            .max_transaction_fee
            .or(settings.default_max_transaction_fee)
            .unwrap_or_else(|| self.data.default_max_transaction_fee());
        let duration = self
            .valid_duration
            .unwrap_or(settings.transaction_valid_duration);

        self.seal(transaction_id, node_account_ids, fee, duration)
    }

    /// Freeze without a client. The transaction id and node list must both
    /// have been set.
    pub fn freeze(&mut self) -> Result<Transaction<D>> {
        if let Some(frozen) = &self.frozen {
            return Ok(frozen.clone());
        }
        let transaction_id = self
            .transaction_id
            .clone()
            .ok_or(Error::FreezeIncomplete("transaction id"))?;
        let node_account_ids = self
            .node_account_ids
            .clone()
            .ok_or(Error::FreezeIncomplete("node account ids"))?;
        let fee = self
            .max_transaction_fee
            .unwrap_or_else(|| self.data.default_max_transaction_fee());
        let duration = self
            .valid_duration
            .unwrap_or(DEFAULT_TRANSACTION_VALID_DURATION);

        self.seal(transaction_id, node_account_ids, fee, duration)
    }

    fn seal(
        &mut self,
        transaction_id: TransactionId,
        node_account_ids: Vec<AccountId>,
        max_transaction_fee: u64,
        valid_duration: Duration,
    ) -> Result<Transaction<D>> {
        if node_account_ids.is_empty() {
            return Err(Error::Validation("node account id list is empty".into()));
        }
        transaction_id.account_id.check_wire_range()?;
        for node in &node_account_ids {
            node.check_wire_range()?;
        }
        let mut seen = HashSet::new();
        if let Some(dup) = node_account_ids.iter().find(|n| !seen.insert(*n)) {
            return Err(Error::Validation(format!("node {dup} is listed twice")));
        }
        if self.memo.len() > MAX_MEMO_LENGTH {
            return Err(Error::Validation(format!(
                "memo is {} bytes, limit is {MAX_MEMO_LENGTH}",
                self.memo.len()
            )));
        }
        if valid_duration.is_zero() || valid_duration > MAX_TRANSACTION_VALID_DURATION {
            return Err(Error::Validation(format!(
                "valid duration {valid_duration:?} is outside 1s..={MAX_TRANSACTION_VALID_DURATION:?}"
            )));
        }
        self.data.validate()?;

        let frozen = Transaction::new(
            self.data.clone(),
            transaction_id,
            node_account_ids,
            max_transaction_fee,
            valid_duration,
            self.memo.clone(),
        );
        debug!(
            transaction = %frozen.log_id(),
            nodes = frozen.node_account_ids().len(),
            fee = max_transaction_fee,
            "frozen"
        );

        // The builder now mirrors what was bound.
        self.transaction_id = Some(frozen.transaction_id().clone());
        self.node_account_ids = Some(frozen.node_account_ids().to_vec());
        self.frozen = Some(frozen.clone());
        Ok(frozen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Timestamp;
    use crate::transaction::TransferTransaction;

    fn payer() -> AccountId {
        AccountId::new(0, 0, 1001)
    }

    fn builder() -> TransferTransaction {
        let mut tx = TransferTransaction::new();
        tx.nova_transfer(payer(), -100)
            .unwrap()
            .nova_transfer(AccountId::new(0, 0, 1002), 100)
            .unwrap()
            .transaction_id(TransactionId::new(payer(), Timestamp::new(1_700_000_000, 0)))
            .unwrap()
            .node_account_ids([AccountId::new(0, 0, 3), AccountId::new(0, 0, 4)])
            .unwrap();
        tx
    }

    #[test]
    fn freeze_needs_id_and_nodes() {
        let mut tx = TransferTransaction::new();
        tx.nova_transfer(payer(), 0).unwrap();
        assert!(matches!(
            tx.freeze(),
            Err(Error::FreezeIncomplete("transaction id"))
        ));
        tx.transaction_id(TransactionId::generate(payer())).unwrap();
        assert!(matches!(
            tx.freeze(),
            Err(Error::FreezeIncomplete("node account ids"))
        ));
    }

    #[test]
    fn setters_fault_after_freeze() {
        let mut tx = builder();
        tx.freeze().unwrap();

        fn frozen(r: Result<&mut TransferTransaction>) -> bool {
            matches!(
                r,
                Err(Error::IllegalState {
                    kind: IllegalStateKind::Frozen
                })
            )
        }
        assert!(frozen(tx.memo("late")));
        assert!(frozen(tx.max_transaction_fee(1)));
        assert!(frozen(tx.transaction_valid_duration(Duration::from_secs(30))));
        assert!(frozen(tx.node_account_ids([AccountId::new(0, 0, 5)])));
        assert!(frozen(tx.transaction_id(TransactionId::generate(payer()))));
        assert!(frozen(tx.nova_transfer(payer(), 1)));
    }

    #[test]
    fn freezing_twice_returns_the_same_bytes() {
        let mut tx = builder();
        let first = tx.freeze().unwrap();
        let second = tx.freeze().unwrap();
        assert_eq!(first.body_bytes(0), second.body_bytes(0));
        assert_eq!(first.body_bytes(1), second.body_bytes(1));
    }

    #[test]
    fn long_memo_is_rejected_at_freeze() {
        let mut tx = builder();
        tx.memo("x".repeat(MAX_MEMO_LENGTH + 1)).unwrap();
        assert!(matches!(tx.freeze(), Err(Error::Validation(_))));
        assert!(!tx.is_frozen());
    }

    #[test]
    fn valid_duration_is_bounded() {
        let mut tx = builder();
        tx.transaction_valid_duration(MAX_TRANSACTION_VALID_DURATION + Duration::from_secs(1))
            .unwrap();
        assert!(matches!(tx.freeze(), Err(Error::Validation(_))));
    }

    #[test]
    fn duplicate_nodes_are_rejected() {
        let mut tx = builder();
        tx.node_account_ids([AccountId::new(0, 0, 3), AccountId::new(0, 0, 3)])
            .unwrap();
        assert!(matches!(tx.freeze(), Err(Error::Validation(_))));
    }

    #[test]
    fn ids_that_do_not_fit_the_wire_are_rejected() {
        let mut tx = builder();
        tx.node_account_ids([AccountId::new(0, 0, u64::MAX)]).unwrap();
        assert!(matches!(
            tx.freeze(),
            Err(Error::Parse(crate::identity::ParseError::OutOfRange("num")))
        ));

        let mut tx = builder();
        tx.transaction_id(TransactionId::generate(AccountId::new(u64::MAX, 0, 1001)))
            .unwrap();
        assert!(matches!(tx.freeze(), Err(Error::Parse(_))));
    }

    #[test]
    fn default_fee_comes_from_the_kind() {
        let mut tx = builder();
        let frozen = tx.freeze().unwrap();
        assert_eq!(
            frozen.max_transaction_fee(),
            crate::config::DEFAULT_MAX_TRANSACTION_FEE
        );
    }
}
