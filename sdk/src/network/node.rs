//! Per-node health tracking.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::{NODE_MAX_BACKOFF, NODE_MIN_BACKOFF};
use crate::identity::AccountId;

// ---------------------------------------------------------------------------
// NodeBackoff
// ---------------------------------------------------------------------------

/// Bounds for how long a failing node is benched.
///
/// The first failure benches a node for `min`. Every consecutive failure
/// after that doubles the bench time, up to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeBackoff {
    pub min: Duration,
    pub max: Duration,
}

impl Default for NodeBackoff {
    fn default() -> Self {
        Self {
            min: NODE_MIN_BACKOFF,
            max: NODE_MAX_BACKOFF,
        }
    }
}

// ---------------------------------------------------------------------------
// NetworkNode
// ---------------------------------------------------------------------------

/// A ledger node as the client knows it.
#[derive(Debug, Clone)]
pub struct NetworkNode {
    pub account_id: AccountId,
    pub address: String,
    consecutive_failures: u32,
    current_backoff: Duration,
    backoff_until: Option<Instant>,
    last_used: u64,
    total_failures: u64,
    total_successes: u64,
    last_failure: Option<String>,
}

/// Point-in-time copy of a node's health, for callers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHealthSnapshot {
    pub account_id: AccountId,
    pub consecutive_failures: u32,
    pub backoff_remaining: Duration,
    pub total_failures: u64,
    pub total_successes: u64,
    pub last_used: u64,
    pub last_failure: Option<String>,
}

impl NetworkNode {
    pub fn new(account_id: AccountId, address: impl Into<String>) -> Self {
        Self {
            account_id,
            address: address.into(),
            consecutive_failures: 0,
            current_backoff: Duration::ZERO,
            backoff_until: None,
            last_used: 0,
            total_failures: 0,
            total_successes: 0,
            last_failure: None,
        }
    }

    /// Time left on the node's bench, zero if it's healthy.
    pub fn backoff_remaining(&self, now: Instant) -> Duration {
        self.backoff_until
            .map(|until| until.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_healthy(&self, now: Instant) -> bool {
        self.backoff_remaining(now).is_zero()
    }

    pub fn last_used(&self) -> u64 {
        self.last_used
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub(crate) fn mark_used(&mut self, tick: u64) {
        self.last_used = tick;
    }

    /// Record a failure and bench the node. Returns the bench duration.
    pub(crate) fn penalize(&mut self, now: Instant, bounds: NodeBackoff, reason: &str) -> Duration {
        self.current_backoff = if self.consecutive_failures == 0 {
            bounds.min
        } else {
            (self.current_backoff * 2).min(bounds.max)
        };
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.total_failures += 1;
        self.backoff_until = Some(now + self.current_backoff);
        self.last_failure = Some(reason.to_string());
        self.current_backoff
    }

    /// Record a success and clear any backoff.
    pub(crate) fn recover(&mut self) {
        self.consecutive_failures = 0;
        self.current_backoff = Duration::ZERO;
        self.backoff_until = None;
        self.total_successes += 1;
    }

    pub fn snapshot(&self, now: Instant) -> NodeHealthSnapshot {
        NodeHealthSnapshot {
            account_id: self.account_id.clone(),
            consecutive_failures: self.consecutive_failures,
            backoff_remaining: self.backoff_remaining(now),
            total_failures: self.total_failures,
            total_successes: self.total_successes,
            last_used: self.last_used,
            last_failure: self.last_failure.clone(),
        }
    }
}
