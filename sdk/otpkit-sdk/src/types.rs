use otpkit_state::encoding::{amount, hash_hex};
use otpkit_state::{recovery_index, Address, Hash};
use serde::{Deserialize, Serialize};

use crate::utils::hex_view;

/// Client-side record of a deployed wallet.
///
/// Holds what is needed to rebuild proofs later: the hseed and tree
/// parameters. The seed itself is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub name: String,
    pub address: Address,
    #[serde(with = "hash_hex")]
    pub root: Hash,
    #[serde(with = "hash_hex")]
    pub hseed: Hash,
    pub effective_time: u64,
    pub duration: u64,
    pub interval: u32,
    pub height: u8,
    pub slot_size: u8,
    pub last_resort_address: Address,
    #[serde(with = "amount")]
    pub spending_limit: u128,
    pub spending_interval: u64,
    pub identification_keys: Vec<String>,
    /// Hex roots of the inner trees
    pub inner_roots: Vec<String>,
    pub double_otp: bool,
    /// False when the relayer returned an address other than the predicted one
    pub address_matches_prediction: bool,
}

impl WalletRecord {
    pub fn root_hex(&self) -> String {
        hex_view(&self.root)
    }

    pub fn t0(&self) -> u64 {
        self.effective_time / self.interval.max(1) as u64
    }

    pub fn lifespan(&self) -> u32 {
        (self.duration / self.interval.max(1) as u64) as u32
    }

    pub fn recovery_index(&self) -> u32 {
        recovery_index(self.height)
    }

    /// First second past the tree's coverage.
    pub fn expires_at(&self) -> u64 {
        self.effective_time + self.duration
    }
}
