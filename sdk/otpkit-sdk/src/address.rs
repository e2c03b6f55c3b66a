//! Address Predictor
//!
//! Derives the deployment address from the seed alone, so it can be shown
//! while the tree is still building.

use otpkit_state::{create2_address, identification_salt, sha256, Address, Hash};
use tracing::warn;

use crate::seed::Seed;

/// `hex(sha256(hseed))`, the key the deployment salt is derived from.
pub fn identification_key(hseed: &Hash) -> String {
    hex::encode(sha256(hseed))
}

pub fn predict_address_for_key(key: &str, deployer: &Address, code_hash: &Hash) -> Address {
    create2_address(deployer, &identification_salt(key), code_hash)
}

pub fn predict_address(seed: &Seed, deployer: &Address, code_hash: &Hash) -> Address {
    predict_address_for_key(&identification_key(&seed.hseed()), deployer, code_hash)
}

/// Compares the relayer's address with the prediction. A mismatch is
/// reported, not fatal.
pub fn check_deployed_address(predicted: Option<&Address>, actual: &Address) -> bool {
    match predicted {
        Some(predicted) if predicted != actual => {
            warn!(%predicted, %actual, "deployed address differs from prediction");
            false
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otpkit_state::keccak256;

    #[test]
    fn prediction_is_seed_only_and_deterministic() {
        let seed = Seed::from_bytes([9u8; 20]);
        let deployer = Address([0x11; 20]);
        let code = keccak256(b"wallet");
        let a = predict_address(&seed, &deployer, &code);
        assert_eq!(a, predict_address(&seed, &deployer, &code));
        assert_ne!(a, predict_address(&Seed::from_bytes([8u8; 20]), &deployer, &code));
        assert_ne!(a, predict_address(&seed, &Address([0x12; 20]), &code));
    }

    #[test]
    fn identification_key_is_lower_hex() {
        let key = identification_key(&[0u8; 32]);
        assert_eq!(key.len(), 64);
        assert_eq!(key, key.to_lowercase());
    }

    #[test]
    fn mismatch_is_reported() {
        let a = Address([1; 20]);
        let b = Address([2; 20]);
        assert!(check_deployed_address(None, &a));
        assert!(check_deployed_address(Some(&a), &a));
        assert!(!check_deployed_address(Some(&a), &b));
    }
}
