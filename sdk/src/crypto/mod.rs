//! # Cryptographic Capability
//!
//! The SDK does not do interesting cryptography. It needs exactly three
//! things, and this module is where they live:
//!
//! - **Ed25519 keys** ([`PrivateKey`], [`PublicKey`]) for the common case of
//!   signing locally.
//! - **The [`Signer`] trait**, an async seam for anything that can produce a
//!   signature: a local key, an HSM, a wallet on the other side of a socket.
//! - **SHA-384**, which is how the ledger names a submitted transaction.
//!
//! Everything here wraps audited implementations. Nothing here is clever.

pub mod hash;
pub mod keys;
pub mod signer;

pub use hash::sha384;
pub use keys::{KeyError, PrivateKey, PublicKey};
pub use signer::{Signer, SignerError};
