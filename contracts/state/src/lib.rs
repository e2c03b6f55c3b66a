//! OtpKit State Module
//!
//! Shared data model for the one-time-password smart wallet: addresses,
//! hashing primitives, Merkle path arithmetic and the deployed wallet
//! configuration. Used by both the authorizer and the client SDK so the two
//! sides hash and derive identically.

pub mod address;
pub mod config;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod merkle;

pub use address::{create2_address, identification_salt, Address};
pub use config::{InnerCore, WalletConfig};
pub use error::OtpStateError;
pub use hash::{hash_pair, keccak256, keccak256_concat, sha256, sha256_concat, Hash, ZERO_HASH};
pub use merkle::{compute_root, leaf_capacity, leaf_from_proof, recovery_index, verify_path};

/// Smallest tree that can carry one time slot plus the recovery leaf.
pub const MIN_TREE_HEIGHT: u8 = 2;

/// Largest supported tree, bounded by the `u32` leaf index.
pub const MAX_TREE_HEIGHT: u8 = 32;
