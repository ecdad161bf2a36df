//! The network map: which nodes exist, how healthy they are, and which one
//! to try next.
//!
//! Selection prefers, in order:
//!
//! 1. nodes with no active backoff, least recently used first;
//! 2. backed-off nodes, soonest-to-recover first.
//!
//! A selected node is marked used, so concurrent requests fan out across
//! healthy nodes instead of piling onto the first one in the address book.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::node::{NetworkNode, NodeBackoff, NodeHealthSnapshot};
use super::rpc::{Channel, GrpcChannel};
use crate::config::LedgerId;
use crate::error::{Error, Result};
use crate::identity::AccountId;

/// Address used for nodes that have no network endpoint (injected channels).
const IN_MEMORY_ADDRESS: &str = "in-memory";

/// The outcome of picking one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub node: AccountId,
    /// Zero for a healthy node; otherwise how long until it recovers.
    pub backoff_remaining: Duration,
}

/// Known nodes and their health.
pub struct Network {
    ledger_id: Option<LedgerId>,
    order: Vec<AccountId>,
    nodes: DashMap<AccountId, NetworkNode>,
    channels: HashMap<AccountId, Arc<dyn Channel>>,
    backoff: NodeBackoff,
    tick: AtomicU64,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("ledger_id", &self.ledger_id)
            .field("nodes", &self.order)
            .finish()
    }
}

impl Network {
    /// Build a network from an address book of `address → node account id`
    /// entries, with a lazily connecting gRPC channel per node.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_address_book<I>(book: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, AccountId)>,
    {
        let mut entries = Vec::new();
        for (address, node) in book {
            let channel: Arc<dyn Channel> = Arc::new(GrpcChannel::connect_lazy(&address)?);
            entries.push((node, address, channel));
        }
        Self::build(entries)
    }

    /// Build a network over caller-supplied channels.
    pub fn from_channels<I>(channels: I) -> Result<Self>
    where
        I: IntoIterator<Item = (AccountId, Arc<dyn Channel>)>,
    {
        Self::build(
            channels
                .into_iter()
                .map(|(node, channel)| (node, IN_MEMORY_ADDRESS.to_string(), channel))
                .collect(),
        )
    }

    fn build(entries: Vec<(AccountId, String, Arc<dyn Channel>)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::EmptyNetwork);
        }
        let mut order = Vec::with_capacity(entries.len());
        let nodes = DashMap::with_capacity(entries.len());
        let mut channels = HashMap::with_capacity(entries.len());
        for (node, address, channel) in entries {
            if channels.contains_key(&node) {
                return Err(Error::Config(format!("node {node} listed twice")));
            }
            order.push(node.clone());
            nodes.insert(node.clone(), NetworkNode::new(node.clone(), address));
            channels.insert(node, channel);
        }
        Ok(Self {
            ledger_id: None,
            order,
            nodes,
            channels,
            backoff: NodeBackoff::default(),
            tick: AtomicU64::new(0),
        })
    }

    pub fn with_ledger_id(mut self, ledger_id: LedgerId) -> Self {
        self.ledger_id = Some(ledger_id);
        self
    }

    pub fn with_node_backoff(mut self, backoff: NodeBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn ledger_id(&self) -> Option<&LedgerId> {
        self.ledger_id.as_ref()
    }

    /// Node account ids in address-book order.
    pub fn node_ids(&self) -> &[AccountId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, node: &AccountId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn channel(&self, node: &AccountId) -> Result<Arc<dyn Channel>> {
        self.channels
            .get(node)
            .cloned()
            .ok_or_else(|| Error::UnknownNode(node.clone()))
    }

    pub fn health(&self, node: &AccountId) -> Option<NodeHealthSnapshot> {
        let now = Instant::now();
        self.nodes.get(node).map(|n| n.snapshot(now))
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Up to `count` nodes from the whole network, best first, skipping
    /// `excluding`.
    pub fn select(&self, excluding: &HashSet<AccountId>, count: usize) -> Vec<AccountId> {
        let mut ranked = self.rank(&self.order, excluding);
        ranked.truncate(count);
        let picked: Vec<AccountId> = ranked.into_iter().map(|s| s.node).collect();
        for node in &picked {
            self.mark_used(node);
        }
        trace!(nodes = ?picked, "selected nodes");
        picked
    }

    /// The best node among `candidates`, skipping `excluding`. Candidates
    /// the network doesn't know are ignored.
    pub fn select_from(
        &self,
        candidates: &[AccountId],
        excluding: &HashSet<AccountId>,
    ) -> Option<Selection> {
        let best = self.rank(candidates, excluding).into_iter().next()?;
        self.mark_used(&best.node);
        trace!(node = %best.node, backoff = ?best.backoff_remaining, "selected node");
        Some(best)
    }

    fn rank(&self, candidates: &[AccountId], excluding: &HashSet<AccountId>) -> Vec<Selection> {
        let now = Instant::now();
        let mut scored: Vec<(Duration, u64, usize, AccountId)> = candidates
            .iter()
            .enumerate()
            .filter(|(_, id)| !excluding.contains(*id))
            .filter_map(|(position, id)| {
                let node = self.nodes.get(id)?;
                Some((
                    node.backoff_remaining(now),
                    node.last_used(),
                    position,
                    id.clone(),
                ))
            })
            .collect();
        scored.sort();
        scored
            .into_iter()
            .map(|(backoff_remaining, _, _, node)| Selection {
                node,
                backoff_remaining,
            })
            .collect()
    }

    fn mark_used(&self, node: &AccountId) {
        let tick = self.tick.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(mut entry) = self.nodes.get_mut(node) {
            entry.mark_used(tick);
        }
    }

    // -----------------------------------------------------------------------
    // Health feedback
    // -----------------------------------------------------------------------

    /// Bench a node after a node-level failure. Returns the bench duration.
    pub fn penalize(&self, node: &AccountId, reason: &str) -> Duration {
        let now = Instant::now();
        match self.nodes.get_mut(node) {
            Some(mut entry) => {
                let benched = entry.penalize(now, self.backoff, reason);
                warn!(
                    node = %node,
                    failures = entry.consecutive_failures(),
                    backoff = ?benched,
                    reason,
                    "node penalized"
                );
                benched
            }
            None => Duration::ZERO,
        }
    }

    /// Clear a node's backoff after it accepted a request.
    pub fn recover(&self, node: &AccountId) {
        if let Some(mut entry) = self.nodes.get_mut(node) {
            if entry.consecutive_failures() > 0 {
                debug!(node = %node, "node recovered");
            }
            entry.recover();
        }
    }
}
