//! Leaf preimages.

use otpkit_state::{keccak256_concat, sha256_concat, Hash};

use crate::core::constants::{INNER_TREE_TAG, RECOVERY_PROOF_TAG};

/// One-time proof revealed for `(counter, sub_index)`. The second code is
/// present only for double-OTP wallets.
pub fn one_time_proof(
    hseed: &Hash,
    counter: u64,
    sub_index: u8,
    code: u32,
    second_code: Option<u32>,
) -> Hash {
    let counter = counter.to_be_bytes();
    let sub = [sub_index];
    let code = code.to_be_bytes();
    match second_code {
        Some(code2) => {
            let code2 = code2.to_be_bytes();
            sha256_concat(&[hseed, &counter, &sub, &code, &code2])
        }
        None => sha256_concat(&[hseed, &counter, &sub, &code]),
    }
}

/// Proof of the recovery leaf, derivable from the hseed alone.
pub fn recovery_proof(hseed: &Hash) -> Hash {
    sha256_concat(&[hseed, RECOVERY_PROOF_TAG])
}

/// Seed hash of the `k`-th inner tree.
pub fn inner_hseed(hseed: &Hash, k: u32) -> Hash {
    keccak256_concat(&[hseed, INNER_TREE_TAG, &k.to_be_bytes()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_code_changes_proof() {
        let hseed = [7u8; 32];
        let single = one_time_proof(&hseed, 10, 0, 123456, None);
        let double = one_time_proof(&hseed, 10, 0, 123456, Some(0));
        assert_ne!(single, double);
        assert_ne!(single, one_time_proof(&hseed, 10, 1, 123456, None));
        assert_ne!(single, one_time_proof(&hseed, 11, 0, 123456, None));
    }

    #[test]
    fn inner_seeds_are_distinct() {
        let hseed = [7u8; 32];
        assert_ne!(inner_hseed(&hseed, 0), inner_hseed(&hseed, 1));
        assert_ne!(inner_hseed(&hseed, 0), hseed);
    }
}
