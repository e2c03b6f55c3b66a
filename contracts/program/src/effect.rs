use otpkit_state::Address;
use serde::{Deserialize, Serialize};

/// Observable outcome of an applied operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum Effect {
    PaymentSent {
        dest: Address,
        #[serde(with = "otpkit_state::encoding::amount")]
        amount: u128,
    },
    /// `wallet` passed a payment on to its forward address
    PaymentForwarded {
        wallet: Address,
        dest: Address,
        #[serde(with = "otpkit_state::encoding::amount")]
        amount: u128,
    },
    RecoveryAddressUpdated {
        address: Address,
    },
    RecoveryTriggered {
        address: Address,
        #[serde(with = "otpkit_state::encoding::amount")]
        amount: u128,
    },
    ForwardAddressUpdated {
        dest: Address,
    },
}

/// Result of an accepted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub wallet: Address,
    /// Wallet nonce after the operation
    pub nonce: u64,
    pub effects: Vec<Effect>,
}
