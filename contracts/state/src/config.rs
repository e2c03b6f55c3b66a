//! Wallet configuration committed at deployment.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::OtpStateError;
use crate::hash::Hash;
use crate::merkle::{leaf_capacity, recovery_index};
use crate::{MAX_TREE_HEIGHT, MIN_TREE_HEIGHT};

/// Summary of an inner proof tree, merged into the wallet at deployment.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerCore {
    #[serde(with = "crate::encoding::hash_hex")]
    pub root: Hash,
    pub height: u8,
    pub interval: u32,
    pub t0: u64,
    pub lifespan: u32,
    pub slot_size: u8,
}

impl InnerCore {
    pub fn validate(&self) -> Result<(), OtpStateError> {
        check_shape(self.height, self.interval, self.lifespan, self.slot_size)
    }
}

/// Immutable configuration of a deployed wallet.
///
/// `height`, `t0`, `lifespan` and `slot_size` must describe the tree that
/// produced `root`; a mismatch makes every future proof unverifiable.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConfig {
    /// Root of the primary proof tree
    #[serde(with = "crate::encoding::hash_hex")]
    pub root: Hash,

    /// Hashes derived from the seed; the first one salts the deployment address
    pub identification_keys: Vec<String>,

    pub inner_cores: Vec<InnerCore>,

    /// Number of layers in the tree, root layer included
    pub height: u8,

    /// Seconds per time slot
    pub interval: u32,

    /// First covered slot counter (`effective_time / interval`)
    pub t0: u64,

    /// Number of covered slots (`duration / interval`)
    pub lifespan: u32,

    /// Authorizations available per slot
    pub slot_size: u8,

    pub last_resort_address: Address,

    /// Per-window spending cap in base units
    #[serde(with = "crate::encoding::amount")]
    pub spending_limit: u128,

    /// Spending window length in seconds
    pub spending_interval: u64,
}

impl WalletConfig {
    pub fn validate(&self) -> Result<(), OtpStateError> {
        check_shape(self.height, self.interval, self.lifespan, self.slot_size)?;
        if self.identification_keys.is_empty() {
            return Err(OtpStateError::MissingIdentificationKey);
        }
        for core in &self.inner_cores {
            core.validate()?;
        }
        Ok(())
    }

    pub fn recovery_index(&self) -> u32 {
        recovery_index(self.height)
    }

    /// First second covered by the tree.
    pub fn start_time(&self) -> u64 {
        self.t0.saturating_mul(self.interval as u64)
    }

    /// First second past the tree's coverage.
    pub fn end_time(&self) -> u64 {
        (self.t0.saturating_add(self.lifespan as u64)).saturating_mul(self.interval as u64)
    }
}

fn check_shape(height: u8, interval: u32, lifespan: u32, slot_size: u8) -> Result<(), OtpStateError> {
    if !(MIN_TREE_HEIGHT..=MAX_TREE_HEIGHT).contains(&height) {
        return Err(OtpStateError::InvalidHeight(height));
    }
    if interval == 0 {
        return Err(OtpStateError::ZeroInterval);
    }
    if lifespan == 0 {
        return Err(OtpStateError::ZeroLifespan);
    }
    if slot_size == 0 {
        return Err(OtpStateError::ZeroSlotSize);
    }
    // One leaf per (slot, sub-index) plus the recovery leaf.
    let required = lifespan as u64 * slot_size as u64 + 1;
    if required > leaf_capacity(height) {
        return Err(OtpStateError::TreeTooSmall { height, required });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WalletConfig {
        WalletConfig {
            root: [9u8; 32],
            identification_keys: vec!["ab".repeat(32)],
            inner_cores: vec![],
            height: 5,
            interval: 30,
            t0: 56_666_666,
            lifespan: 12,
            slot_size: 1,
            last_resort_address: Address([1u8; 20]),
            spending_limit: 1_000_000_000_000_000_000,
            spending_interval: 86_400,
        }
    }

    #[test]
    fn consistent_config_validates() {
        assert_eq!(config().validate(), Ok(()));
        assert_eq!(config().recovery_index(), 15);
    }

    #[test]
    fn rejects_tree_without_room_for_recovery_leaf() {
        let mut c = config();
        c.lifespan = 16;
        assert_eq!(
            c.validate(),
            Err(OtpStateError::TreeTooSmall {
                height: 5,
                required: 17
            })
        );
    }

    #[test]
    fn rejects_zero_parameters() {
        let mut c = config();
        c.slot_size = 0;
        assert_eq!(c.validate(), Err(OtpStateError::ZeroSlotSize));
        let mut c = config();
        c.interval = 0;
        assert_eq!(c.validate(), Err(OtpStateError::ZeroInterval));
        let mut c = config();
        c.identification_keys.clear();
        assert_eq!(c.validate(), Err(OtpStateError::MissingIdentificationKey));
    }

    #[test]
    fn coverage_window() {
        let c = config();
        assert_eq!(c.start_time(), 56_666_666 * 30);
        assert_eq!(c.end_time(), (56_666_666 + 12) * 30);
    }

    #[test]
    fn json_uses_camel_case_and_string_amounts() {
        let json = serde_json::to_value(config()).unwrap();
        assert_eq!(json["slotSize"], 1);
        assert_eq!(json["spendingLimit"], "1000000000000000000");
        assert_eq!(json["lastResortAddress"], Address([1u8; 20]).to_string());
        let back: WalletConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config());
    }
}
