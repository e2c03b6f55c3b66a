//! Hash primitives shared by the tree builder and the verifier.

use alloy_primitives::Keccak256;
use sha2::{Digest, Sha256};

pub type Hash = [u8; 32];

/// Padding leaf value. No revealed proof hashes to it.
pub const ZERO_HASH: Hash = [0u8; 32];

pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

pub fn sha256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

pub fn keccak256(data: &[u8]) -> Hash {
    alloy_primitives::keccak256(data).0
}

pub fn keccak256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(*part);
    }
    hasher.finalize().0
}

/// Parent node of two adjacent tree nodes.
#[inline]
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    sha256_concat(&[left, right])
}
