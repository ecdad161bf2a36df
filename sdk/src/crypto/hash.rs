//! Hash functions.

use sha2::{Digest, Sha384};

/// Output length of [`sha384`] in bytes.
pub const SHA384_LENGTH: usize = 48;

/// SHA-384 digest. The ledger identifies a submitted transaction by the
/// SHA-384 of its signed-transaction bytes.
pub fn sha384(data: &[u8]) -> Vec<u8> {
    Sha384::digest(data).to_vec()
}
