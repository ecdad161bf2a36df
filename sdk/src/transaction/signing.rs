//! Signature collection for frozen transactions.
//!
//! A frozen transaction pinned to N nodes has N body encodings (each names
//! its own node). Every signer therefore contributes N signatures, one per
//! body, stored together under the signer's public key.
//!
//! Rules:
//!
//! - one entry per public key; adding a key that's already there replaces
//!   its signatures rather than adding a second entry;
//! - entries keep insertion order in memory, but the wire form is sorted by
//!   public key (see [`crate::codec::signature_map`]), so the order in which
//!   independent signers show up never changes the bytes sent.

use crate::crypto::PublicKey;

/// One public key and its signature over one body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePair {
    pub public_key: PublicKey,
    pub signature: Vec<u8>,
}

/// All signatures collected for a frozen transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureSet {
    entries: Vec<(PublicKey, Vec<Vec<u8>>)>,
}

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `signatures` (one per node, node order) under `public_key`.
    /// Returns `true` if the key is new; an existing key keeps its position
    /// and gets the new signatures.
    pub fn insert(&mut self, public_key: PublicKey, signatures: Vec<Vec<u8>>) -> bool {
        match self.entries.iter_mut().find(|(pk, _)| *pk == public_key) {
            Some(entry) => {
                entry.1 = signatures;
                false
            }
            None => {
                self.entries.push((public_key, signatures));
                true
            }
        }
    }

    pub fn contains(&self, public_key: &PublicKey) -> bool {
        self.entries.iter().any(|(pk, _)| pk == public_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Public keys in the order they signed.
    pub fn public_keys(&self) -> impl Iterator<Item = &PublicKey> {
        self.entries.iter().map(|(pk, _)| pk)
    }

    /// Signature pairs for the body at `node_index`.
    pub fn pairs_for(&self, node_index: usize) -> Vec<SignaturePair> {
        self.entries
            .iter()
            .filter_map(|(pk, sigs)| {
                sigs.get(node_index).map(|sig| SignaturePair {
                    public_key: *pk,
                    signature: sig.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;

    #[test]
    fn duplicate_key_keeps_one_entry() {
        let key = PrivateKey::generate();
        let mut set = SignatureSet::new();
        assert!(set.insert(key.public_key(), vec![vec![1]]));
        assert!(!set.insert(key.public_key(), vec![vec![2]]));
        assert_eq!(set.len(), 1);
        assert_eq!(set.pairs_for(0)[0].signature, vec![2]);
    }

    #[test]
    fn pairs_follow_insertion_order() {
        let a = PrivateKey::generate().public_key();
        let b = PrivateKey::generate().public_key();
        let mut set = SignatureSet::new();
        set.insert(b, vec![vec![0xB0], vec![0xB1]]);
        set.insert(a, vec![vec![0xA0], vec![0xA1]]);

        let pairs = set.pairs_for(1);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].public_key, b);
        assert_eq!(pairs[1].signature, vec![0xA1]);
        assert_eq!(set.public_keys().copied().collect::<Vec<_>>(), vec![b, a]);
    }
}
