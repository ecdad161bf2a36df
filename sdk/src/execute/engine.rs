//! The retry loop.
//!
//! One function, [`execute`], drives every transaction and every query:
//!
//! ```text
//!   ┌──▶ pick node (sticky, else best non-excluded candidate)
//!   │        │ all excluded → clear, wait out the best node's backoff
//!   │    build request for node (once; cached and reused verbatim)
//!   │    send, bounded by the remaining deadline
//!   │        │
//!   │    classify ──▶ Accepted          → recover node, return
//!   │        │        Terminal          → typed error
//!   │        │        NodeTransient     → penalize, exclude, rotate
//!   └────────┴─────── RequestTransient  → same node after policy delay
//! ```
//!
//! Attempts are bounded by the policy and by the deadline, whichever comes
//! first. Both exhaustion errors carry the last outcome seen per node.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::backoff::RetryPolicy;
use super::classify::{classify_transport, Verdict};
use crate::error::{AttemptOutcome, Error, LastStatuses, Result};
use crate::identity::{AccountId, TransactionId};
use crate::network::{Channel, Network};
use crate::proto::Status;

/// Something the engine can send: a frozen transaction or a prepared query.
#[async_trait]
pub(crate) trait Execute: Sync {
    /// What goes on the wire to one node.
    type Request: Clone + Send + Sync;
    /// What comes back from a node that answered.
    type Response: Send;
    /// What the caller gets on success.
    type Output: Send;

    /// Candidate nodes, in preference order.
    fn node_account_ids(&self) -> &[AccountId];

    /// The transaction this request is about, for error reporting.
    fn transaction_id(&self) -> Option<&TransactionId>;

    /// Short human label for logs.
    fn log_id(&self) -> String;

    /// Build the request for `node`. Called at most once per node per
    /// execution.
    fn make_request(&self, node: &AccountId) -> Result<Self::Request>;

    async fn send(
        &self,
        channel: &dyn Channel,
        request: Self::Request,
    ) -> std::result::Result<Self::Response, tonic::Status>;

    /// Status the node reported, and what to do about it.
    fn classify(&self, response: &Self::Response) -> (Status, Verdict);

    fn make_output(
        &self,
        response: Self::Response,
        request: &Self::Request,
        node: &AccountId,
    ) -> Result<Self::Output>;
}

/// Run `executable` against `network` until it is accepted, fails
/// terminally, or runs out of attempts or time.
pub(crate) async fn execute<E: Execute>(
    network: &Network,
    executable: &E,
    policy: &RetryPolicy,
    timeout: Duration,
) -> Result<E::Output> {
    let log_id = executable.log_id();
    let candidates = executable.node_account_ids();
    if candidates.is_empty() {
        return Err(Error::EmptyNetwork);
    }
    if let Some(unknown) = candidates.iter().find(|n| !network.contains(n)) {
        return Err(Error::UnknownNode(unknown.clone()));
    }

    let started = Instant::now();
    let deadline = started + timeout;
    let max_attempts = policy.max_attempts.max(1);

    let mut requests: HashMap<AccountId, E::Request> = HashMap::new();
    let mut excluded: HashSet<AccountId> = HashSet::new();
    let mut last = LastStatuses::new();
    let mut sticky: Option<AccountId> = None;
    let mut attempts: u32 = 0;

    let timed_out = |attempts: u32, last: &LastStatuses| Error::Timeout {
        elapsed: started.elapsed(),
        attempts,
        last: last.clone(),
    };

    loop {
        // -------------------------------------------------------------------
        // Pick a node
        // -------------------------------------------------------------------
        let node = match sticky.take() {
            Some(node) => node,
            None => {
                let selection = match network.select_from(candidates, &excluded) {
                    Some(selection) => selection,
                    None => {
                        debug!(request = %log_id, "every candidate failed this round, wrapping around");
                        excluded.clear();
                        network
                            .select_from(candidates, &excluded)
                            .ok_or(Error::EmptyNetwork)?
                    }
                };
                if !selection.backoff_remaining.is_zero() {
                    debug!(
                        request = %log_id,
                        node = %selection.node,
                        wait = ?selection.backoff_remaining,
                        "waiting for node backoff"
                    );
                    if !sleep_within(deadline, selection.backoff_remaining).await {
                        return Err(timed_out(attempts, &last));
                    }
                }
                selection.node
            }
        };

        let request = match requests.get(&node) {
            Some(request) => request.clone(),
            None => {
                let request = executable.make_request(&node)?;
                requests.insert(node.clone(), request.clone());
                request
            }
        };
        let channel = network.channel(&node)?;

        // -------------------------------------------------------------------
        // Send
        // -------------------------------------------------------------------
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(timed_out(attempts, &last));
        }
        attempts += 1;
        debug!(request = %log_id, node = %node, attempt = attempts, "sending");

        let sent = tokio::time::timeout(remaining, executable.send(channel.as_ref(), request.clone())).await;
        let Ok(answer) = sent else {
            warn!(request = %log_id, node = %node, attempt = attempts, "deadline hit mid-flight");
            return Err(timed_out(attempts, &last));
        };

        // -------------------------------------------------------------------
        // Classify
        // -------------------------------------------------------------------
        let (verdict, reason) = match answer {
            Ok(response) => {
                let (status, verdict) = executable.classify(&response);
                last.record(node.clone(), AttemptOutcome::Precheck(status));
                match verdict {
                    Verdict::Accepted => {
                        network.recover(&node);
                        info!(request = %log_id, node = %node, attempt = attempts, "accepted");
                        return executable.make_output(response, &request, &node);
                    }
                    Verdict::Terminal => {
                        // The node is healthy; the request is not.
                        network.recover(&node);
                        warn!(request = %log_id, node = %node, %status, "terminal precheck");
                        return Err(Error::Precheck {
                            status,
                            transaction_id: executable.transaction_id().cloned(),
                            node,
                        });
                    }
                    transient => (transient, status.to_string()),
                }
            }
            Err(status) => {
                last.record(node.clone(), AttemptOutcome::Transport(status.code()));
                match classify_transport(&status) {
                    Verdict::Terminal => {
                        warn!(request = %log_id, node = %node, error = %status, "transport failure");
                        return Err(Error::Transport { node, status });
                    }
                    transient => (transient, format!("transport {:?}", status.code())),
                }
            }
        };

        let mut delay = Duration::ZERO;
        match verdict {
            Verdict::NodeTransient => {
                network.penalize(&node, &reason);
                excluded.insert(node);
            }
            Verdict::RequestTransient => {
                delay = policy.delay_for_attempt(attempts);
                debug!(request = %log_id, node = %node, %reason, ?delay, "not ready, retrying same node");
                sticky = Some(node);
            }
            Verdict::Accepted | Verdict::Terminal => {}
        }

        if attempts >= max_attempts {
            warn!(request = %log_id, attempts, last = %last, "retry budget exhausted");
            return Err(Error::MaxAttemptsExceeded { attempts, last });
        }

        if !delay.is_zero() && !sleep_within(deadline, delay).await {
            return Err(timed_out(attempts, &last));
        }
    }
}

/// Sleep for `duration` unless that would run past `deadline`, in which
/// case return `false` right away.
async fn sleep_within(deadline: Instant, duration: Duration) -> bool {
    if Instant::now() + duration >= deadline {
        return false;
    }
    tokio::time::sleep(duration).await;
    true
}
