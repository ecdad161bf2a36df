//! Receipt and record resolution after a submission.

mod common;

use std::time::Duration;

use prost::Message;
use tokio::time::Instant;

use common::{node_id, operator_client, payer, recipient, Reply, ScriptedNode};
use nova_sdk::network::ServiceMethod;
use nova_sdk::proto;
use nova_sdk::{
    Error, Status, TransactionId, TransactionReceiptQuery, TransactionRecordQuery,
    TransactionResponse, TransferTransaction,
};

fn node_with_receipts(queries: Vec<Reply>) -> std::sync::Arc<ScriptedNode> {
    ScriptedNode::new(vec![Reply::Precheck(Status::Ok)], queries)
}

async fn submit(client: &nova_sdk::Client) -> anyhow::Result<TransactionResponse> {
    let mut tx = TransferTransaction::new();
    tx.nova_transfer(payer(), -250)?
        .nova_transfer(recipient(), 250)?
        .node_account_ids([node_id(0)])?;
    Ok(tx.freeze_with(client)?.execute(client).await?)
}

#[tokio::test(start_paused = true)]
async fn pending_receipt_is_polled_until_final() -> anyhow::Result<()> {
    let node = node_with_receipts(vec![
        Reply::Receipt(Status::Unknown),
        Reply::Receipt(Status::Unknown),
        Reply::Receipt(Status::Unknown),
        Reply::Receipt(Status::Success),
    ]);
    let (client, _) = operator_client(&[node.clone()]);
    let response = submit(&client).await?;

    let started = Instant::now();
    let receipt = response.get_receipt(&client).await?;

    assert!(receipt.is_success());
    assert_eq!(receipt.transaction_id.as_ref(), Some(&response.transaction_id));
    assert_eq!(node.query_calls(), 4);
    // 250ms, 500ms, 1s before jitter.
    assert!(started.elapsed() >= Duration::from_millis(1_750));

    // Pending answers are about the transaction, not the node.
    let health = client.network().health(&node_id(0)).unwrap();
    assert_eq!(health.total_failures, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn receipt_not_found_is_retried() -> anyhow::Result<()> {
    let node = node_with_receipts(vec![
        Reply::Precheck(Status::ReceiptNotFound),
        Reply::Receipt(Status::Success),
    ]);
    let (client, _) = operator_client(&[node.clone()]);
    let response = submit(&client).await?;

    assert!(response.get_receipt(&client).await?.is_success());
    assert_eq!(node.query_calls(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_receipt_raises_unless_validation_is_off() -> anyhow::Result<()> {
    let node = node_with_receipts(vec![Reply::Receipt(Status::InsufficientPayerBalance)]);
    let (client, _) = operator_client(&[node.clone()]);
    let response = submit(&client).await?;

    let err = response.get_receipt(&client).await.unwrap_err();
    match err {
        Error::ReceiptStatus {
            status,
            code,
            transaction_id,
        } => {
            assert_eq!(status, Status::InsufficientPayerBalance);
            assert_eq!(code, Status::InsufficientPayerBalance as i32);
            assert_eq!(transaction_id, response.transaction_id);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let receipt = response
        .clone()
        .validate_status(false)
        .get_receipt(&client)
        .await?;
    assert_eq!(receipt.status, Status::InsufficientPayerBalance);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unlisted_final_code_surfaces_instead_of_polling() -> anyhow::Result<()> {
    // 83 is a real ledger failure this build has no name for.
    let node = node_with_receipts(vec![Reply::ReceiptCode(83)]);
    let (client, _) = operator_client(&[node.clone()]);
    let id = TransactionId::generate(payer());

    let err = TransactionReceiptQuery::new(id.clone())
        .execute(&client)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            Error::ReceiptStatus {
                status: Status::Unrecognized,
                code: 83,
                ..
            }
        ),
        "{err:?}"
    );
    assert_eq!(node.query_calls(), 1);

    let receipt = TransactionReceiptQuery::new(id)
        .validate_status(false)
        .execute(&client)
        .await?;
    assert_eq!(receipt.status, Status::Unrecognized);
    assert_eq!(receipt.code, 83);
    assert_eq!(node.query_calls(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn receipt_query_goes_to_the_accepting_node() -> anyhow::Result<()> {
    let other = ScriptedNode::healthy();
    let accepting = ScriptedNode::healthy();
    let (client, _) = operator_client(&[other.clone(), accepting.clone()]);

    let mut tx = TransferTransaction::new();
    tx.nova_transfer(payer(), -1)?
        .nova_transfer(recipient(), 1)?
        .node_account_ids([node_id(1)])?;
    let response = tx.freeze_with(&client)?.execute(&client).await?;
    assert_eq!(response.node_id, node_id(1));

    response.get_receipt(&client).await?;
    assert_eq!(other.query_calls(), 0);
    assert_eq!(accepting.query_calls(), 1);

    let (method, query) = accepting.received_queries.lock()[0].clone();
    assert_eq!(method, ServiceMethod::GetTransactionReceipts);
    match query.query {
        Some(proto::query::Query::TransactionGetReceipt(q)) => {
            assert_eq!(q.transaction_id, Some(response.transaction_id.to_proto()));
            // Receipts are free.
            assert!(q.header.and_then(|h| h.payment).is_none());
        }
        other => panic!("unexpected query: {other:?}"),
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn record_is_paid_for_by_the_operator() -> anyhow::Result<()> {
    let node = ScriptedNode::healthy();
    let (client, _) = operator_client(&[node.clone()]);
    let response = submit(&client).await?;

    let record = response.get_record(&client).await?;
    assert!(record.receipt.is_success());
    assert_eq!(record.transaction_id, response.transaction_id);
    assert_eq!(record.transaction_fee, 84_000);

    let queries = node.received_queries.lock().clone();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].0, ServiceMethod::GetTransactionReceipts);
    assert_eq!(queries[1].0, ServiceMethod::GetTxRecordByTxId);

    let Some(proto::query::Query::TransactionGetRecord(q)) = queries[1].1.query.clone() else {
        panic!("expected a record query");
    };
    let payment = q
        .header
        .and_then(|h| h.payment)
        .expect("record query carries a payment");
    let signed = proto::SignedTransaction::decode(payment.signed_transaction_bytes.as_slice())?;
    let body = proto::TransactionBody::decode(signed.body_bytes.as_slice())?;
    assert_eq!(body.node_account_id, Some(node_id(0).to_proto()));
    assert_eq!(signed.sig_map.unwrap_or_default().sig_pair.len(), 1);

    let Some(proto::transaction_body::Data::CryptoTransfer(transfer)) = body.data else {
        panic!("payment is not a transfer");
    };
    let amounts: Vec<(Option<proto::AccountId>, i64)> = transfer
        .transfers
        .unwrap_or_default()
        .account_amounts
        .into_iter()
        .map(|aa| (aa.account_id, aa.amount))
        .collect();
    let fee = nova_sdk::config::DEFAULT_QUERY_PAYMENT as i64;
    assert!(amounts.contains(&(Some(payer().to_proto()), -fee)));
    assert!(amounts.contains(&(Some(node_id(0).to_proto()), fee)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn record_needs_an_operator_to_pay() {
    let node = ScriptedNode::healthy();
    let client = common::client(&[node.clone()]);

    let err = TransactionRecordQuery::new(TransactionId::generate(payer()))
        .execute(&client)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoOperator));
    assert_eq!(node.query_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn query_payment_over_the_ceiling_is_refused() {
    let node = ScriptedNode::healthy();
    let (client, _) = operator_client(&[node.clone()]);
    client.set_max_query_payment(1_000);

    let err = TransactionRecordQuery::new(TransactionId::generate(payer()))
        .payment_amount(5_000)
        .execute(&client)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::QueryPaymentTooHigh {
            payment: 5_000,
            max: 1_000
        }
    ));
    assert_eq!(node.query_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn transaction_id_resolves_its_own_receipt() -> anyhow::Result<()> {
    let node = node_with_receipts(vec![
        Reply::Receipt(Status::Unknown),
        Reply::Receipt(Status::Success),
    ]);
    let (client, _) = operator_client(&[node.clone()]);
    let id = TransactionId::generate(payer());

    let receipt = id.get_receipt(&client).await?;
    assert_eq!(receipt.transaction_id, Some(id));
    assert_eq!(node.query_calls(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn receipt_that_never_settles_times_out() {
    let node = node_with_receipts(vec![Reply::Receipt(Status::Unknown)]);
    let (client, _) = operator_client(&[node.clone()]);
    client.set_receipt_timeout(Duration::from_secs(3));

    let started = Instant::now();
    let err = TransactionReceiptQuery::new(TransactionId::generate(payer()))
        .execute(&client)
        .await
        .unwrap_err();

    assert!(err.is_exhausted(), "{err:?}");
    assert!(started.elapsed() <= Duration::from_secs(3));
    assert!(node.query_calls() >= 2);
}
