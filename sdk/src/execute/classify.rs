//! Outcome classification.
//!
//! Every answer a node gives (or fails to give) lands in exactly one of
//! four buckets, and the bucket alone decides what the engine does next.

use crate::proto::Status;

/// What the engine should do with an attempt's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Done. Hand the response back.
    Accepted,
    /// The node is unwell. Penalize it and try another one.
    NodeTransient,
    /// The node is fine but the answer isn't ready. Same node, after a delay.
    RequestTransient,
    /// Retrying cannot help. Surface the error.
    Terminal,
}

/// Precheck status of a transaction submission.
pub fn classify_precheck(status: Status) -> Verdict {
    match status {
        Status::Ok => Verdict::Accepted,
        Status::Busy | Status::PlatformNotActive | Status::InvalidNodeAccount => {
            Verdict::NodeTransient
        }
        Status::PlatformTransactionNotCreated => Verdict::RequestTransient,
        _ => Verdict::Terminal,
    }
}

/// Header status of a receipt or record query.
pub fn classify_lookup_precheck(status: Status) -> Verdict {
    match status {
        Status::Ok => Verdict::Accepted,
        Status::Busy | Status::PlatformNotActive | Status::InvalidNodeAccount => {
            Verdict::NodeTransient
        }
        Status::Unknown
        | Status::ReceiptNotFound
        | Status::RecordNotFound
        | Status::PlatformTransactionNotCreated => Verdict::RequestTransient,
        _ => Verdict::Terminal,
    }
}

/// Status inside a receipt that the node did return.
///
/// `Unknown` and `Ok` mean consensus hasn't finished with the transaction
/// yet. Anything else is final, success or not.
pub fn classify_receipt_status(status: Status) -> Verdict {
    match status {
        Status::Unknown | Status::Ok | Status::Busy | Status::PlatformNotActive => {
            Verdict::RequestTransient
        }
        Status::ReceiptNotFound | Status::RecordNotFound => Verdict::RequestTransient,
        _ => Verdict::Accepted,
    }
}

/// A gRPC-level failure.
///
/// Unavailable, resource exhausted, deadline exceeded and HTTP/2 stream
/// resets say nothing about the request and everything about the node.
pub fn classify_transport(status: &tonic::Status) -> Verdict {
    match status.code() {
        tonic::Code::Unavailable
        | tonic::Code::ResourceExhausted
        | tonic::Code::DeadlineExceeded => Verdict::NodeTransient,
        tonic::Code::Internal if is_stream_reset(status.message()) => Verdict::NodeTransient,
        _ => Verdict::Terminal,
    }
}

fn is_stream_reset(message: &str) -> bool {
    message.contains("RST_STREAM") || message.contains("stream reset")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precheck_partition() {
        assert_eq!(classify_precheck(Status::Ok), Verdict::Accepted);
        assert_eq!(classify_precheck(Status::Busy), Verdict::NodeTransient);
        assert_eq!(classify_precheck(Status::PlatformNotActive), Verdict::NodeTransient);
        assert_eq!(classify_precheck(Status::InvalidNodeAccount), Verdict::NodeTransient);
        assert_eq!(
            classify_precheck(Status::PlatformTransactionNotCreated),
            Verdict::RequestTransient
        );
        for terminal in [
            Status::InvalidSignature,
            Status::InsufficientTxFee,
            Status::DuplicateTransaction,
            Status::TransactionExpired,
            Status::Unauthorized,
            Status::InsufficientPayerBalance,
        ] {
            assert_eq!(classify_precheck(terminal), Verdict::Terminal, "{terminal}");
        }
    }

    #[test]
    fn lookup_waits_for_missing_receipts() {
        assert_eq!(classify_lookup_precheck(Status::ReceiptNotFound), Verdict::RequestTransient);
        assert_eq!(classify_lookup_precheck(Status::RecordNotFound), Verdict::RequestTransient);
        assert_eq!(classify_lookup_precheck(Status::Unknown), Verdict::RequestTransient);
        assert_eq!(classify_lookup_precheck(Status::InvalidTransactionId), Verdict::Terminal);
        assert_eq!(classify_lookup_precheck(Status::from_code(83)), Verdict::Terminal);
    }

    #[test]
    fn receipt_status_partition() {
        assert_eq!(classify_receipt_status(Status::Unknown), Verdict::RequestTransient);
        assert_eq!(classify_receipt_status(Status::Ok), Verdict::RequestTransient);
        assert_eq!(classify_receipt_status(Status::Success), Verdict::Accepted);
        // Final failures are still final; validation happens later.
        assert_eq!(classify_receipt_status(Status::InsufficientAccountBalance), Verdict::Accepted);
        assert_eq!(classify_receipt_status(Status::from_code(83)), Verdict::Accepted);
        assert_eq!(classify_receipt_status(Status::from_code(21)), Verdict::RequestTransient);
    }

    #[test]
    fn transport_partition() {
        assert_eq!(
            classify_transport(&tonic::Status::unavailable("down")),
            Verdict::NodeTransient
        );
        assert_eq!(
            classify_transport(&tonic::Status::resource_exhausted("slow down")),
            Verdict::NodeTransient
        );
        assert_eq!(
            classify_transport(&tonic::Status::internal("Received RST_STREAM with code 0")),
            Verdict::NodeTransient
        );
        assert_eq!(
            classify_transport(&tonic::Status::internal("bad things")),
            Verdict::Terminal
        );
        assert_eq!(
            classify_transport(&tonic::Status::invalid_argument("nope")),
            Verdict::Terminal
        );
    }
}
