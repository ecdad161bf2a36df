//! Retry, rotation and node health, driven through real transactions.

mod common;

use std::time::Duration;

use tokio::time::Instant;

use common::{node_id, operator_client, payer, recipient, Reply, ScriptedNode};
use nova_sdk::error::AttemptOutcome;
use nova_sdk::{Error, Status, TransferTransaction};

fn transfer_to(nodes: usize) -> TransferTransaction {
    let mut tx = TransferTransaction::new();
    tx.nova_transfer(payer(), -1_000)
        .unwrap()
        .nova_transfer(recipient(), 1_000)
        .unwrap()
        .node_account_ids((0..nodes).map(node_id))
        .unwrap();
    tx
}

#[tokio::test(start_paused = true)]
async fn busy_single_node_is_waited_out() -> anyhow::Result<()> {
    let node = ScriptedNode::submitting(vec![
        Reply::Precheck(Status::Busy),
        Reply::Precheck(Status::Busy),
        Reply::Precheck(Status::Ok),
    ]);
    let (client, _) = operator_client(&[node.clone()]);

    let started = Instant::now();
    let response = transfer_to(1).freeze_with(&client)?.execute(&client).await?;

    assert_eq!(response.node_id, node_id(0));
    assert_eq!(node.transaction_calls(), 3);
    // Benched 8s after the first Busy, 16s after the second.
    assert!(started.elapsed() >= Duration::from_secs(24));

    let health = client.network().health(&node_id(0)).unwrap();
    assert_eq!(health.consecutive_failures, 0);
    assert_eq!(health.total_failures, 2);
    assert_eq!(health.total_successes, 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn busy_node_rotates_to_the_next_one() -> anyhow::Result<()> {
    let busy = ScriptedNode::submitting(vec![Reply::Precheck(Status::Busy)]);
    let ok = ScriptedNode::healthy();
    let (client, _) = operator_client(&[busy.clone(), ok.clone()]);

    let started = Instant::now();
    let response = transfer_to(2).freeze_with(&client)?.execute(&client).await?;

    assert_eq!(response.node_id, node_id(1));
    assert_eq!(busy.transaction_calls(), 1);
    assert_eq!(ok.transaction_calls(), 1);
    assert!(started.elapsed() < Duration::from_secs(1));

    let health = client.network().health(&node_id(0)).unwrap();
    assert_eq!(health.consecutive_failures, 1);
    assert_eq!(health.last_failure.as_deref(), Some("Busy"));
    assert!(!health.backoff_remaining.is_zero());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unreachable_network_exhausts_the_budget() {
    let nodes = vec![
        ScriptedNode::submitting(vec![Reply::Transport(tonic::Code::Unavailable)]),
        ScriptedNode::submitting(vec![Reply::Transport(tonic::Code::Unavailable)]),
    ];
    let (client, _) = operator_client(&nodes);
    client.set_max_attempts(4);

    let mut frozen = transfer_to(2).freeze_with(&client).unwrap();
    let err = frozen.execute(&client).await.unwrap_err();

    assert!(err.is_exhausted(), "{err:?}");
    match err {
        Error::MaxAttemptsExceeded { attempts, last } => {
            assert_eq!(attempts, 4);
            for i in 0..2 {
                assert_eq!(
                    last.get(&node_id(i)),
                    Some(&AttemptOutcome::Transport(tonic::Code::Unavailable))
                );
            }
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(nodes[0].transaction_calls() + nodes[1].transaction_calls(), 4);
    assert!(!frozen.is_executed());
}

#[tokio::test(start_paused = true)]
async fn terminal_precheck_names_the_transaction() {
    let rejecting = ScriptedNode::submitting(vec![Reply::Precheck(Status::InsufficientPayerBalance)]);
    let spare = ScriptedNode::healthy();
    let (client, _) = operator_client(&[rejecting.clone(), spare.clone()]);

    let mut frozen = transfer_to(2).freeze_with(&client).unwrap();
    let err = frozen.execute(&client).await.unwrap_err();

    match &err {
        Error::Precheck {
            status,
            transaction_id,
            node,
        } => {
            assert_eq!(*status, Status::InsufficientPayerBalance);
            assert_eq!(transaction_id.as_ref(), Some(frozen.transaction_id()));
            assert_eq!(*node, node_id(0));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.status(), Some(Status::InsufficientPayerBalance));
    assert_eq!(spare.transaction_calls(), 0);
    // The node answered; it isn't held against it.
    assert_eq!(client.network().health(&node_id(0)).unwrap().consecutive_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn deadline_ends_the_wait() {
    let node = ScriptedNode::submitting(vec![Reply::Precheck(Status::PlatformNotActive)]);
    let (client, _) = operator_client(&[node.clone()]);

    let mut frozen = transfer_to(1).freeze_with(&client).unwrap();
    let err = frozen
        .execute_with_timeout(&client, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { attempts: 1, .. }), "{err:?}");
    assert_eq!(node.transaction_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_executions_share_node_health() -> anyhow::Result<()> {
    let flaky = ScriptedNode::submitting(vec![Reply::Precheck(Status::Busy)]);
    let steady = ScriptedNode::healthy();
    let (client, _) = operator_client(&[flaky.clone(), steady.clone()]);

    let mut first = transfer_to(2).freeze_with(&client)?;
    let mut second = transfer_to(2).freeze_with(&client)?;
    let mut third = transfer_to(2).freeze_with(&client)?;

    let (a, b, c) = tokio::join!(
        first.execute(&client),
        second.execute(&client),
        third.execute(&client)
    );
    for response in [a?, b?, c?] {
        assert_eq!(response.node_id, node_id(1));
    }

    let flaky_health = client.network().health(&node_id(0)).unwrap();
    let steady_health = client.network().health(&node_id(1)).unwrap();
    assert_eq!(flaky_health.total_failures as usize, flaky.transaction_calls());
    assert_eq!(flaky_health.consecutive_failures as usize, flaky.transaction_calls());
    assert_eq!(steady_health.total_successes as usize, steady.transaction_calls());
    assert_eq!(steady.transaction_calls(), 3);
    Ok(())
}
