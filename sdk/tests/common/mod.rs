//! Shared fixtures: an in-memory network of scripted nodes.
//!
//! Each node answers from a script. Once the script runs out, its last
//! entry repeats forever. Every request a node receives is kept so tests
//! can look at exactly what went over the wire.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use nova_sdk::network::{Channel, Network, ServiceMethod};
use nova_sdk::proto;
use nova_sdk::{AccountId, Client, PrivateKey, Status};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Transactions: this precheck. Queries: this header precheck and no
    /// receipt.
    Precheck(Status),
    /// Queries: precheck OK and a receipt (or record) with this status.
    Receipt(Status),
    /// Queries: precheck OK and a receipt carrying this raw wire code.
    ReceiptCode(i32),
    /// Fail the call at the transport level.
    Transport(tonic::Code),
}

/// A node that answers from scripts.
pub struct ScriptedNode {
    submissions: Mutex<VecDeque<Reply>>,
    queries: Mutex<VecDeque<Reply>>,
    pub received_transactions: Mutex<Vec<(ServiceMethod, proto::Transaction)>>,
    pub received_queries: Mutex<Vec<(ServiceMethod, proto::Query)>>,
}

impl ScriptedNode {
    pub fn new(submissions: Vec<Reply>, queries: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            submissions: Mutex::new(submissions.into()),
            queries: Mutex::new(queries.into()),
            received_transactions: Mutex::new(Vec::new()),
            received_queries: Mutex::new(Vec::new()),
        })
    }

    /// Accepts every submission and reports every receipt as successful.
    pub fn healthy() -> Arc<Self> {
        Self::new(
            vec![Reply::Precheck(Status::Ok)],
            vec![Reply::Receipt(Status::Success)],
        )
    }

    /// Answers submissions from `replies`; receipts are always successful.
    pub fn submitting(replies: Vec<Reply>) -> Arc<Self> {
        Self::new(replies, vec![Reply::Receipt(Status::Success)])
    }

    pub fn transaction_calls(&self) -> usize {
        self.received_transactions.lock().len()
    }

    pub fn query_calls(&self) -> usize {
        self.received_queries.lock().len()
    }

    fn next(script: &Mutex<VecDeque<Reply>>) -> Reply {
        let mut script = script.lock();
        if script.len() > 1 {
            script.pop_front().unwrap_or(Reply::Precheck(Status::Ok))
        } else {
            script.front().cloned().unwrap_or(Reply::Precheck(Status::Ok))
        }
    }
}

fn header(status: Status) -> Option<proto::ResponseHeader> {
    Some(proto::ResponseHeader {
        node_transaction_precheck_code: status as i32,
        ..Default::default()
    })
}

fn receipt(code: i32) -> proto::TransactionReceipt {
    proto::TransactionReceipt {
        status: code,
        ..Default::default()
    }
}

#[async_trait]
impl Channel for ScriptedNode {
    async fn submit_transaction(
        &self,
        method: ServiceMethod,
        request: proto::Transaction,
    ) -> Result<proto::TransactionResponse, tonic::Status> {
        self.received_transactions.lock().push((method, request));
        match Self::next(&self.submissions) {
            Reply::Precheck(status) | Reply::Receipt(status) => Ok(proto::TransactionResponse {
                node_transaction_precheck_code: status as i32,
                cost: 0,
            }),
            Reply::ReceiptCode(code) => Ok(proto::TransactionResponse {
                node_transaction_precheck_code: code,
                cost: 0,
            }),
            Reply::Transport(code) => Err(tonic::Status::new(code, "scripted failure")),
        }
    }

    async fn submit_query(
        &self,
        method: ServiceMethod,
        request: proto::Query,
    ) -> Result<proto::Response, tonic::Status> {
        let transaction_id = match &request.query {
            Some(proto::query::Query::TransactionGetReceipt(q)) => q.transaction_id.clone(),
            Some(proto::query::Query::TransactionGetRecord(q)) => q.transaction_id.clone(),
            None => None,
        };
        self.received_queries.lock().push((method, request));

        let (precheck, receipt) = match Self::next(&self.queries) {
            Reply::Precheck(status) => (status, None),
            Reply::Receipt(status) => (Status::Ok, Some(receipt(status as i32))),
            Reply::ReceiptCode(code) => (Status::Ok, Some(receipt(code))),
            Reply::Transport(code) => return Err(tonic::Status::new(code, "scripted failure")),
        };

        let response = match method {
            ServiceMethod::GetTxRecordByTxId => {
                proto::response::Response::TransactionGetRecord(proto::TransactionGetRecordResponse {
                    header: header(precheck),
                    transaction_record: receipt.map(|receipt| proto::TransactionRecord {
                        receipt: Some(receipt),
                        transaction_hash: vec![0xAB; 48],
                        transaction_id,
                        transaction_fee: 84_000,
                        ..Default::default()
                    }),
                })
            }
            _ => proto::response::Response::TransactionGetReceipt(proto::TransactionGetReceiptResponse {
                header: header(precheck),
                receipt,
                ..Default::default()
            }),
        };
        Ok(proto::Response {
            response: Some(response),
        })
    }
}

/// Node account id of the `i`-th scripted node.
pub fn node_id(i: usize) -> AccountId {
    AccountId::new(0, 0, 3 + i as u64)
}

pub fn payer() -> AccountId {
    AccountId::new(0, 0, 1001)
}

pub fn recipient() -> AccountId {
    AccountId::new(0, 0, 1002)
}

/// A client over the given nodes, no operator.
pub fn client(nodes: &[Arc<ScriptedNode>]) -> Client {
    let network = Network::from_channels(
        nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node_id(i), node.clone() as Arc<dyn Channel>)),
    )
    .expect("non-empty network");
    Client::with_network(network)
}

/// A client over the given nodes with `payer()` as operator.
pub fn operator_client(nodes: &[Arc<ScriptedNode>]) -> (Client, PrivateKey) {
    let client = client(nodes);
    let key = PrivateKey::generate();
    client.set_operator(payer(), key.clone());
    (client, key)
}
