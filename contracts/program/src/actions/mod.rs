pub mod forward;
pub mod recover;
pub mod set_recovery_address;
pub mod transfer;

pub use forward::*;
pub use recover::*;
pub use set_recovery_address::*;
pub use transfer::*;

use otp_assertions::{
    check_add, check_below, check_bytes_match, check_in_window, check_len, check_not_before,
};
use otpkit_state::{compute_root, keccak256_concat, leaf_capacity, leaf_from_proof, Hash};
use tracing::debug;

use crate::error::OtpKitError;
use crate::instruction::{AuthorizationRequest, OperationType};
use crate::ledger::TransferFailure;
use crate::state::{CommitKey, WalletAccount};

/// Which kind of leaf a verified proof was revealed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofKind {
    /// Regular time-slot leaf
    Slot(CommitKey),
    /// The dedicated recovery leaf: not bound to any time slot, usable once
    Recovery,
}

/// A proof that passed every check against the wallet's commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedProof {
    pub leaf: Hash,
    pub kind: ProofKind,
    /// Binds the leaf to the operation parameters it authorized
    pub commitment: Hash,
}

impl VerifiedProof {
    pub fn commit(&self) -> Option<(CommitKey, Hash)> {
        match self.kind {
            ProofKind::Slot(key) => Some((key, self.commitment)),
            ProofKind::Recovery => None,
        }
    }
}

/// Checks a revealed proof against the wallet's root, time window and
/// consumed commits. Reads the wallet, never writes it.
///
/// # Arguments
/// * `wallet` - The wallet the attempt targets
/// * `request` - The operation attempt
///
/// # Returns
/// * The verified proof, or the rejection explaining why it failed
pub fn authenticate_proof(
    wallet: &WalletAccount,
    request: &AuthorizationRequest,
) -> Result<VerifiedProof, OtpKitError> {
    let config = wallet.config();
    let state = wallet.state();

    // === 1. MERKLE PATH ===
    check_len(
        request.merkle_path.len(),
        config.height as usize - 1,
        OtpKitError::InvalidMerklePath,
    )?;
    check_below(
        request.index as u64,
        leaf_capacity(config.height),
        OtpKitError::IndexOutOfRange,
    )?;
    let leaf = leaf_from_proof(&request.one_time_proof);
    let root = compute_root(&leaf, request.index, &request.merkle_path);
    check_bytes_match(&root, &config.root, 32, OtpKitError::InvalidProof)?;

    // === 2. ORDERING ===
    check_not_before(
        request.timestamp,
        state.last_operation_time(),
        OtpKitError::StaleTimestamp,
    )?;

    let commitment = keccak256_concat(&[&leaf, &request.params.hash()]);
    // Only the recovery leaf may redirect the wallet's funds.
    let needs_recovery_leaf = matches!(
        request.params.operation_type,
        OperationType::Recover | OperationType::Forward
    );

    // === 3. RECOVERY LEAF ===
    if request.index == config.recovery_index() {
        if !needs_recovery_leaf {
            return Err(OtpKitError::RecoveryLeafMisuse);
        }
        if state.recovery_leaf_spent() {
            return Err(OtpKitError::RecoveryLeafSpent);
        }
        debug!(index = request.index, "recovery leaf verified");
        return Ok(VerifiedProof {
            leaf,
            kind: ProofKind::Recovery,
            commitment,
        });
    }
    if needs_recovery_leaf {
        return Err(OtpKitError::NotRecoveryLeaf);
    }

    // === 4. TIME SLOT ===
    let slot_size = config.slot_size as u32;
    let slot = (request.index / slot_size) as u64;
    let sub_index = (request.index % slot_size) as u8;
    check_below(slot, config.lifespan as u64, OtpKitError::OutsideLifespan)?;
    check_in_window(
        request.timestamp,
        config.start_time(),
        config.end_time(),
        OtpKitError::OutsideLifespan,
    )?;
    let counter = check_add(config.t0, slot, OtpKitError::OutsideLifespan)?;
    if request.timestamp / config.interval as u64 != counter {
        return Err(OtpKitError::SlotMismatch);
    }

    // === 5. REPLAY ===
    let key = CommitKey { counter, sub_index };
    if state.is_committed(&key) {
        return Err(OtpKitError::CommitmentReused);
    }

    debug!(counter, sub_index, "slot proof verified");
    Ok(VerifiedProof {
        leaf,
        kind: ProofKind::Slot(key),
        commitment,
    })
}

pub(crate) fn map_transfer_failure(failure: TransferFailure) -> OtpKitError {
    tracing::warn!(%failure, "transfer call failed");
    OtpKitError::TransferError
}
