//! # Wire Codec
//!
//! Canonical bytes for everything that gets signed or sent.
//!
//! ```text
//! TransactionBody ──encode──▶ body_bytes            (what signers sign)
//! body_bytes + SignatureMap ──▶ SignedTransaction   (sorted by public key)
//! SignedTransaction ──encode──▶ Transaction.signed_transaction_bytes
//! [Transaction; nodes] ──▶ TransactionList          (to_bytes / from_bytes)
//! ```
//!
//! Body bytes are produced once, at freeze, and carried around verbatim
//! afterwards. Nothing downstream re-encodes a body, so a signature made at
//! any point stays valid for the bytes that are eventually sent.

use prost::Message;

use crate::crypto::{sha384, PublicKey};
use crate::error::{Error, Result};
use crate::proto;
use crate::transaction::SignaturePair;

/// Encode a transaction body into the bytes signers sign.
pub fn encode_body(body: &proto::TransactionBody) -> Vec<u8> {
    body.encode_to_vec()
}

/// Wire signature map. Pairs are sorted by public key bytes, so the bytes
/// sent do not depend on the order signatures were collected in.
pub fn signature_map(pairs: &[SignaturePair]) -> proto::SignatureMap {
    let mut sorted: Vec<&SignaturePair> = pairs.iter().collect();
    sorted.sort_by(|a, b| a.public_key.as_bytes().cmp(b.public_key.as_bytes()));
    proto::SignatureMap {
        sig_pair: sorted
            .into_iter()
            .map(|pair| proto::SignaturePair {
                pub_key_prefix: pair.public_key.to_bytes(),
                signature: Some(proto::signature_pair::Signature::Ed25519(
                    pair.signature.clone(),
                )),
            })
            .collect(),
    }
}

/// Wrap body bytes and their signatures into the envelope a node accepts.
pub fn signed_transaction(body_bytes: &[u8], pairs: &[SignaturePair]) -> proto::Transaction {
    let signed = proto::SignedTransaction {
        body_bytes: body_bytes.to_vec(),
        sig_map: Some(signature_map(pairs)),
    };
    proto::Transaction {
        signed_transaction_bytes: signed.encode_to_vec(),
    }
}

/// SHA-384 of the signed-transaction bytes: the ledger's name for a
/// submitted transaction.
pub fn transaction_hash(transaction: &proto::Transaction) -> Vec<u8> {
    sha384(&transaction.signed_transaction_bytes)
}

/// Serialize per-node envelopes as a `TransactionList`.
pub fn encode_transaction_list(transactions: Vec<proto::Transaction>) -> Vec<u8> {
    proto::TransactionList {
        transaction_list: transactions,
    }
    .encode_to_vec()
}

/// One per-node envelope, opened up.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTransaction {
    /// Body bytes exactly as they were on the wire.
    pub body_bytes: Vec<u8>,
    pub body: proto::TransactionBody,
    pub signatures: Vec<SignaturePair>,
}

/// Decode a `TransactionList` back into per-node bodies and signatures.
pub fn decode_transaction_list(bytes: &[u8]) -> Result<Vec<DecodedTransaction>> {
    let list = proto::TransactionList::decode(bytes)?;
    if list.transaction_list.is_empty() {
        return Err(Error::Validation("transaction list is empty".into()));
    }
    list.transaction_list
        .iter()
        .map(decode_transaction)
        .collect()
}

fn decode_transaction(transaction: &proto::Transaction) -> Result<DecodedTransaction> {
    let signed = proto::SignedTransaction::decode(transaction.signed_transaction_bytes.as_slice())?;
    let body = proto::TransactionBody::decode(signed.body_bytes.as_slice())?;
    let signatures = signed
        .sig_map
        .unwrap_or_default()
        .sig_pair
        .into_iter()
        .map(|pair| {
            let public_key = PublicKey::from_bytes(&pair.pub_key_prefix)?;
            match pair.signature {
                Some(proto::signature_pair::Signature::Ed25519(signature)) => Ok(SignaturePair {
                    public_key,
                    signature,
                }),
                None => Err(Error::Validation(format!(
                    "signature pair for {public_key} has no signature"
                ))),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(DecodedTransaction {
        body_bytes: signed.body_bytes,
        body,
        signatures,
    })
}
