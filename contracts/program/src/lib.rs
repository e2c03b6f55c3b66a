//! OtpKit Program - Operation Authorizer
//!
//! Validates revealed one-time proofs against a wallet's committed Merkle root
//! and applies TRANSFER, SET_RECOVERY_ADDRESS, RECOVER and FORWARD under
//! nonce, time-window and spending-limit invariants.

pub mod actions;
pub mod chain;
pub mod effect;
pub mod error;
pub mod instruction;
pub mod ledger;
pub mod processor;
pub mod state;

pub use chain::Chain;
pub use effect::{Effect, Receipt};
pub use error::OtpKitError;
pub use instruction::{AuthorizationRequest, OperationParams, OperationType};
pub use ledger::{Ledger, TransferFailure};
pub use processor::{process_instruction, process_operation};
pub use state::{CommitKey, WalletAccount, WalletState};

/// Longest chain of forwarding wallets a single payment may traverse.
pub const MAX_FORWARD_DEPTH: usize = 8;
