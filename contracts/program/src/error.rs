//! OtpKit Error Types

use otpkit_state::OtpStateError;
use thiserror::Error;

/// Every way an operation attempt can be rejected. None of them alters the
/// wallet: a rejected attempt leaves `WalletState` exactly as it was.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum OtpKitError {
    #[error("Invalid instruction")]
    InvalidInstruction,

    #[error("Wallet not found")]
    UnknownWallet,

    #[error("Wallet configuration is inconsistent")]
    InvalidConfig,

    #[error("A different wallet is already deployed at this address")]
    AlreadyDeployed,

    #[error("Merkle path length does not match tree height")]
    InvalidMerklePath,

    #[error("Leaf index outside the tree")]
    IndexOutOfRange,

    #[error("Proof does not resolve to the wallet root")]
    InvalidProof,

    #[error("Timestamp outside the tree's lifespan")]
    OutsideLifespan,

    #[error("Timestamp does not belong to the proof's time slot")]
    SlotMismatch,

    #[error("Timestamp precedes the last operation")]
    StaleTimestamp,

    #[error("One-time proof already used")]
    CommitmentReused,

    #[error("Nonce overflow")]
    NonceOverflow,

    #[error("Exceed spending limit")]
    ExceedSpendingLimit,

    #[error("Insufficient fund")]
    InsufficientFund,

    #[error("Transfer error")]
    TransferError,

    #[error("Last resort address is not set")]
    LastResortAddressNotSet,

    #[error("Operation requires the recovery leaf")]
    NotRecoveryLeaf,

    #[error("Recovery leaf may only authorize recovery or forwarding")]
    RecoveryLeafMisuse,

    #[error("Recovery leaf already used")]
    RecoveryLeafSpent,

    #[error("Wallet has been recovered")]
    WalletRecovered,

    #[error("Address must not be zero")]
    ZeroAddress,

    #[error("Address must not be the wallet itself")]
    SelfAddress,

    #[error("Address is unchanged")]
    UnchangedAddress,
}

impl From<OtpStateError> for OtpKitError {
    fn from(_: OtpStateError) -> Self {
        OtpKitError::InvalidConfig
    }
}
