//! Low-level construction of authorization requests from stored layers.

use otpkit_program::{AuthorizationRequest, OperationParams};
use otpkit_state::{leaf_from_proof, Hash};

use crate::error::{OtpSdkError, Result};
use crate::tree::leaf::{one_time_proof, recovery_proof};
use crate::tree::{index_for, Layers};
use crate::types::WalletRecord;
use crate::utils::counter_at;

/// Codes typed by the user for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpCodes {
    pub code: u32,
    pub second_code: Option<u32>,
}

impl OtpCodes {
    pub fn single(code: u32) -> Self {
        Self {
            code,
            second_code: None,
        }
    }

    pub fn double(code: u32, second_code: u32) -> Self {
        Self {
            code,
            second_code: Some(second_code),
        }
    }
}

/// Request revealing the leaf of `(timestamp's slot, sub_index)`.
///
/// The derived leaf is checked against the stored layers first, so a wrong
/// code fails here with `CodeMismatch` instead of burning an attempt.
pub fn build_request(
    record: &WalletRecord,
    layers: &Layers,
    params: OperationParams,
    codes: OtpCodes,
    sub_index: u8,
    timestamp: u64,
) -> Result<AuthorizationRequest> {
    if record.double_otp != codes.second_code.is_some() {
        return Err(OtpSdkError::Validation(if record.double_otp {
            "wallet requires a second one-time code".into()
        } else {
            "wallet takes a single one-time code".into()
        }));
    }
    let counter = counter_at(timestamp, record.interval);
    let index = index_for(
        record.t0(),
        record.lifespan(),
        record.slot_size,
        counter,
        sub_index,
    )?;
    let proof = one_time_proof(
        &record.hseed,
        counter,
        sub_index,
        codes.code,
        codes.second_code,
    );
    reveal(layers, params, index, proof, timestamp)
}

/// Request revealing the recovery leaf, for RECOVER or FORWARD. Needs only
/// the hseed.
pub fn build_recovery_request(
    record: &WalletRecord,
    layers: &Layers,
    params: OperationParams,
    timestamp: u64,
) -> Result<AuthorizationRequest> {
    reveal(
        layers,
        params,
        record.recovery_index(),
        recovery_proof(&record.hseed),
        timestamp,
    )
}

fn reveal(
    layers: &Layers,
    params: OperationParams,
    index: u32,
    proof: Hash,
    timestamp: u64,
) -> Result<AuthorizationRequest> {
    let stored = layers
        .leaves()
        .get(index as usize)
        .ok_or_else(|| OtpSdkError::InconsistentTree(format!("no leaf at index {index}")))?;
    if *stored != leaf_from_proof(&proof) {
        return Err(OtpSdkError::CodeMismatch);
    }
    Ok(AuthorizationRequest {
        params,
        index,
        one_time_proof: proof,
        merkle_path: layers.path(index)?,
        timestamp,
    })
}
