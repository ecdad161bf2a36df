//! The signing capability.
//!
//! A [`Signer`] is anything that can hand back a public key and, given some
//! bytes, a signature over them. It is async because the interesting signers
//! (hardware modules, remote wallets) live on the other end of a connection.

use async_trait::async_trait;
use thiserror::Error;

use super::keys::{PrivateKey, PublicKey};

/// Errors a signer can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The signer refused to sign (user declined, policy violation, ...).
    #[error("signing rejected: {0}")]
    Rejected(String),

    /// The signer could not be reached or failed internally.
    #[error("signer unavailable: {0}")]
    Unavailable(String),
}

/// Something that signs bytes.
#[async_trait]
pub trait Signer: Send + Sync {
    fn public_key(&self) -> PublicKey;

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

#[async_trait]
impl Signer for PrivateKey {
    fn public_key(&self) -> PublicKey {
        PrivateKey::public_key(self)
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(PrivateKey::sign(self, message))
    }
}
