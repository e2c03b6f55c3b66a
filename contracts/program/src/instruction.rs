//! OtpKit Operation Definitions

use borsh::{BorshDeserialize, BorshSerialize};
use otpkit_state::{keccak256_concat, Address, Hash};
use serde::{Deserialize, Serialize};

use crate::error::OtpKitError;

/// Operation discriminators
#[derive(
    BorshSerialize, BorshDeserialize, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum OperationType {
    /// Send `amount` to `dest`, or to the forward address once one is set
    Transfer = 0,
    /// Replace the recovery address with `dest`
    SetRecoveryAddress = 1,
    /// Sweep the balance to the recovery address and start forwarding there.
    /// Only the recovery leaf authorizes it.
    Recover = 2,
    /// Start forwarding to `dest` without sweeping the balance
    Forward = 3,
}

impl TryFrom<u8> for OperationType {
    type Error = OtpKitError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OperationType::Transfer),
            1 => Ok(OperationType::SetRecoveryAddress),
            2 => Ok(OperationType::Recover),
            3 => Ok(OperationType::Forward),
            _ => Err(OtpKitError::InvalidInstruction),
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct OperationParams {
    pub operation_type: OperationType,
    pub dest: Address,
    pub amount: u128,
    pub data: Vec<u8>,
}

impl OperationParams {
    pub fn new(operation_type: OperationType, dest: Address, amount: u128) -> Self {
        Self {
            operation_type,
            dest,
            amount,
            data: Vec::new(),
        }
    }

    /// Digest binding a one-time proof to these parameters.
    pub fn hash(&self) -> Hash {
        keccak256_concat(&[
            &[self.operation_type as u8],
            self.dest.as_bytes(),
            &self.amount.to_be_bytes(),
            &self.data,
        ])
    }
}

/// A single operation attempt as submitted to the authorizer.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub params: OperationParams,
    /// Leaf index the proof was revealed for
    pub index: u32,
    /// Revealed one-time proof; its hash is the leaf
    pub one_time_proof: Hash,
    /// Sibling hashes from the leaf up to, not including, the root
    pub merkle_path: Vec<Hash>,
    /// Unix seconds the attempt is made at
    pub timestamp: u64,
}

impl AuthorizationRequest {
    pub fn unpack(input: &[u8]) -> Result<Self, OtpKitError> {
        Self::try_from_slice(input).map_err(|_| OtpKitError::InvalidInstruction)
    }

    pub fn pack(&self) -> Result<Vec<u8>, OtpKitError> {
        borsh::to_vec(self).map_err(|_| OtpKitError::InvalidInstruction)
    }
}
