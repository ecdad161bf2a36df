//! # gRPC Service Methods & the Channel Seam
//!
//! Every ledger RPC is a unary protobuf call. Transactions go in as a
//! [`proto::Transaction`] and come back as a [`proto::TransactionResponse`]
//! carrying a precheck code. Queries go in as a [`proto::Query`] and come
//! back as a [`proto::Response`].
//!
//! ## Method Index
//!
//! | Method                     | Path                                            |
//! |----------------------------|-------------------------------------------------|
//! | `CryptoTransfer`           | `/proto.CryptoService/cryptoTransfer`           |
//! | `CreateSchedule`           | `/proto.ScheduleService/createSchedule`         |
//! | `GetTransactionReceipts`   | `/proto.CryptoService/getTransactionReceipts`   |
//! | `GetTxRecordByTxId`        | `/proto.CryptoService/getTxRecordByTxID`        |
//!
//! The engine talks to nodes only through the [`Channel`] trait. Production
//! uses [`GrpcChannel`]; tests plug in scripted channels.

use std::fmt;

use async_trait::async_trait;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Endpoint;

use crate::config::GRPC_CONNECT_TIMEOUT;
use crate::error::{Error, Result};
use crate::proto;

// ---------------------------------------------------------------------------
// ServiceMethod
// ---------------------------------------------------------------------------

/// The RPCs this SDK knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceMethod {
    CryptoTransfer,
    CreateSchedule,
    GetTransactionReceipts,
    GetTxRecordByTxId,
}

impl ServiceMethod {
    /// Full gRPC path of the method.
    pub const fn path(&self) -> &'static str {
        match self {
            ServiceMethod::CryptoTransfer => "/proto.CryptoService/cryptoTransfer",
            ServiceMethod::CreateSchedule => "/proto.ScheduleService/createSchedule",
            ServiceMethod::GetTransactionReceipts => "/proto.CryptoService/getTransactionReceipts",
            ServiceMethod::GetTxRecordByTxId => "/proto.CryptoService/getTxRecordByTxID",
        }
    }

    /// `true` for methods that take a transaction, `false` for queries.
    pub const fn is_transaction(&self) -> bool {
        matches!(
            self,
            ServiceMethod::CryptoTransfer | ServiceMethod::CreateSchedule
        )
    }
}

impl fmt::Display for ServiceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A connection to one node.
///
/// Implementations report transport failures as `tonic::Status`; precheck
/// codes travel inside the successful response.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn submit_transaction(
        &self,
        method: ServiceMethod,
        transaction: proto::Transaction,
    ) -> std::result::Result<proto::TransactionResponse, tonic::Status>;

    async fn submit_query(
        &self,
        method: ServiceMethod,
        query: proto::Query,
    ) -> std::result::Result<proto::Response, tonic::Status>;
}

// ---------------------------------------------------------------------------
// GrpcChannel
// ---------------------------------------------------------------------------

/// A [`Channel`] backed by a tonic transport channel.
#[derive(Debug, Clone)]
pub struct GrpcChannel {
    address: String,
    inner: tonic::transport::Channel,
}

impl GrpcChannel {
    /// Build a channel that connects on first use.
    ///
    /// `address` is `host:port`; plaintext HTTP/2 is assumed. Must be called
    /// from within a tokio runtime.
    pub fn connect_lazy(address: &str) -> Result<Self> {
        let endpoint = Endpoint::from_shared(format!("http://{address}"))
            .map_err(|e| Error::Config(format!("invalid node address '{address}': {e}")))?
            .connect_timeout(GRPC_CONNECT_TIMEOUT);
        Ok(Self {
            address: address.to_string(),
            inner: endpoint.connect_lazy(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn unary<Req, Resp>(
        &self,
        method: ServiceMethod,
        request: Req,
    ) -> std::result::Result<Resp, tonic::Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.inner.clone());
        grpc.ready().await.map_err(|e| {
            tonic::Status::new(
                tonic::Code::Unavailable,
                format!("Service was not ready: {e}"),
            )
        })?;
        let codec = tonic::codec::ProstCodec::<Req, Resp>::default();
        let path = PathAndQuery::from_static(method.path());
        grpc.unary(tonic::Request::new(request), path, codec)
            .await
            .map(tonic::Response::into_inner)
    }
}

#[async_trait]
impl Channel for GrpcChannel {
    async fn submit_transaction(
        &self,
        method: ServiceMethod,
        transaction: proto::Transaction,
    ) -> std::result::Result<proto::TransactionResponse, tonic::Status> {
        self.unary(method, transaction).await
    }

    async fn submit_query(
        &self,
        method: ServiceMethod,
        query: proto::Query,
    ) -> std::result::Result<proto::Response, tonic::Status> {
        self.unary(method, query).await
    }
}
