//! # Key Management
//!
//! Ed25519 keys for signing transactions locally.
//!
//! ## Security considerations
//!
//! - Secret keys are zeroized on drop (thanks, ed25519-dalek).
//! - Key generation uses `OsRng`.
//! - Secret bytes never reach `Debug`, `Display` or logs. If you add logging
//!   to this module, you will be asked to leave.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{
    Signature as DalekSignature, Signer as _, SigningKey, Verifier as _, VerifyingKey,
    PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNATURE_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::proto;

/// Errors that can occur during key operations.
///
/// Deliberately vague about *why*; error messages are not a side channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not valid hex")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// An Ed25519 secret key.
///
/// Does not implement `Serialize`. Exporting a secret should be a deliberate
/// act: use [`PrivateKey::to_bytes`] or [`PrivateKey::to_hex`].
///
/// # Examples
///
/// ```
/// use nova_sdk::crypto::PrivateKey;
///
/// let key = PrivateKey::generate();
/// let sig = key.sign(b"send 100 NOVA to alice");
/// assert!(key.public_key().verify(b"send 100 NOVA to alice", &sig));
/// ```
pub struct PrivateKey {
    signing_key: SigningKey,
}

impl PrivateKey {
    /// Generate a fresh key from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Construct a key from a 32-byte seed. Weak seed in, weak key out.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let seed: [u8; SECRET_KEY_LENGTH] =
            bytes.try_into().map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    /// Parse a hex-encoded 32-byte secret, as found in config files.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&bytes)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Sign a message. Ed25519 is deterministic: same key, same message,
    /// same 64 bytes.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }

    /// Raw secret bytes. Handle with extreme care.
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl Clone for PrivateKey {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(pub={})", self.public_key())
    }
}

impl FromStr for PrivateKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// An Ed25519 public key.
///
/// Ordered by raw bytes, which is the order signature pairs go on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicKey {
    bytes: [u8; PUBLIC_KEY_LENGTH],
}

impl PublicKey {
    /// Build a key from raw bytes, rejecting anything that is not a valid
    /// curve point.
    pub fn from_bytes(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// `true` if `signature` is a valid signature of `message` under this key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(signature) else {
            return false;
        };
        verifying_key
            .verify(message, &DalekSignature::from_bytes(&sig_bytes))
            .is_ok()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    pub fn to_proto_key(&self) -> proto::Key {
        proto::Key {
            key: Some(proto::key::Key::Ed25519(self.to_bytes())),
        }
    }

    pub fn from_proto_key(pb: &proto::Key) -> Result<Self, KeyError> {
        match &pb.key {
            Some(proto::key::Key::Ed25519(bytes)) => Self::from_bytes(bytes),
            None => Err(KeyError::InvalidPublicKey),
        }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let key = PrivateKey::generate();
        let msg = b"transfer 5 NOVA";
        let sig = key.sign(msg);
        assert_eq!(sig.len(), SIGNATURE_LENGTH);
        assert!(key.public_key().verify(msg, &sig));
        assert!(!key.public_key().verify(b"transfer 6 NOVA", &sig));
    }

    #[test]
    fn signatures_are_deterministic() {
        let key = PrivateKey::from_seed(&[7u8; 32]);
        assert_eq!(key.sign(b"abc"), key.sign(b"abc"));
    }

    #[test]
    fn hex_roundtrip() {
        let key = PrivateKey::generate();
        let back = PrivateKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(back.public_key(), key.public_key());

        let pk = key.public_key();
        assert_eq!(pk.to_string().parse::<PublicKey>().unwrap(), pk);
    }

    #[test]
    fn bad_secret_rejected() {
        assert_eq!(
            PrivateKey::from_hex("abcd").unwrap_err(),
            KeyError::InvalidSecretKey
        );
        assert_eq!(
            PrivateKey::from_hex("not hex at all").unwrap_err(),
            KeyError::InvalidSecretKey
        );
    }

    #[test]
    fn truncated_signature_fails_verification() {
        let key = PrivateKey::generate();
        let sig = key.sign(b"abc");
        assert!(!key.public_key().verify(b"abc", &sig[..63]));
    }

    #[test]
    fn debug_never_prints_secret() {
        let key = PrivateKey::from_seed(&[0xAB; 32]);
        let debug = format!("{key:?}");
        assert!(!debug.contains(&key.to_hex()));
    }

    #[test]
    fn proto_key_roundtrip() {
        let pk = PrivateKey::generate().public_key();
        assert_eq!(PublicKey::from_proto_key(&pk.to_proto_key()).unwrap(), pk);
    }
}
