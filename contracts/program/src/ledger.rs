use otpkit_state::Address;
use thiserror::Error;

use crate::effect::Effect;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFailure {
    #[error("{from} holds {balance}, cannot send {amount}")]
    InsufficientBalance {
        from: Address,
        balance: u128,
        amount: u128,
    },

    #[error("{0} refused the payment")]
    Rejected(Address),

    #[error("Forwarding chain exceeds {0} hops")]
    ForwardLoop(usize),

    #[error("Balance overflow at {0}")]
    Overflow(Address),
}

/// Value-transfer seam between the authorizer and the chain it runs on.
pub trait Ledger {
    fn balance_of(&self, address: &Address) -> u128;

    /// Moves `amount` from `from` to `to`. Either the whole transfer, including
    /// any relaying done by the recipient, happens or nothing does. Returns the
    /// effects emitted by recipients along the way.
    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<Vec<Effect>, TransferFailure>;
}
