use otpkit_program::{AuthorizationRequest, OperationParams, OperationType};
use otpkit_spend_limit_policy::{SpendLimitBuilder, SpendLimitConfig, SpendLimitState};
use otpkit_state::Address;

use crate::advanced::instructions;
use crate::basic::actions::OperationBuilder;
use crate::core::store::TreeStore;
use crate::error::{OtpSdkError, Result};
use crate::tree::Layers;
use crate::types::WalletRecord;

/// A deployed wallet as seen by its owner: the record plus the stored tree.
#[derive(Debug, Clone)]
pub struct OtpWallet {
    record: WalletRecord,
    layers: Layers,
}

impl OtpWallet {
    /// Loads the layers persisted at deployment.
    pub fn load(record: WalletRecord, store: &impl TreeStore) -> Result<Self> {
        let layers = store
            .get(&record.root_hex())
            .map_err(|e| OtpSdkError::Storage(e.to_string()))?
            .ok_or(OtpSdkError::MissingTree)?;
        Self::from_parts(record, layers)
    }

    pub fn from_parts(record: WalletRecord, layers: Layers) -> Result<Self> {
        if layers.root() != Some(record.root) {
            return Err(OtpSdkError::InconsistentTree(
                "stored layers do not match wallet root".into(),
            ));
        }
        if layers.height() != record.height as usize {
            return Err(OtpSdkError::InconsistentTree(format!(
                "stored tree has {} layers, wallet expects {}",
                layers.height(),
                record.height
            )));
        }
        Ok(Self { record, layers })
    }

    pub fn address(&self) -> &Address {
        &self.record.address
    }

    pub fn record(&self) -> &WalletRecord {
        &self.record
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn spend_limit(&self) -> SpendLimitConfig {
        SpendLimitBuilder::new()
            .limit(self.record.spending_limit)
            .interval(self.record.spending_interval)
            .build()
    }

    /// Amount still spendable at `now`, given the wallet's current spending
    /// state as read from the chain.
    pub fn spending_allowance(&self, spending: &SpendLimitState, now: u64) -> u128 {
        self.spend_limit().remaining(spending, now)
    }

    pub fn transfer(&self, dest: Address, amount: u128) -> OperationBuilder<'_> {
        OperationBuilder::new(self, OperationParams::new(OperationType::Transfer, dest, amount))
    }

    pub fn set_recovery_address(&self, address: Address) -> OperationBuilder<'_> {
        OperationBuilder::new(
            self,
            OperationParams::new(OperationType::SetRecoveryAddress, address, 0),
        )
    }

    /// Relinks the wallet to `dest`. Reveals the recovery leaf, so the
    /// wallet can neither forward again nor recover afterwards.
    pub fn forward(&self, dest: Address, timestamp: u64) -> Result<AuthorizationRequest> {
        if dest.is_zero() || dest == self.record.address {
            return Err(OtpSdkError::Validation(format!(
                "cannot forward to {dest}"
            )));
        }
        instructions::build_recovery_request(
            &self.record,
            &self.layers,
            OperationParams::new(OperationType::Forward, dest, 0),
            timestamp,
        )
    }

    /// Recovery needs no code; the recovery leaf is derived from the hseed.
    pub fn recover(&self, timestamp: u64) -> Result<AuthorizationRequest> {
        instructions::build_recovery_request(
            &self.record,
            &self.layers,
            OperationParams::new(OperationType::Recover, Address::ZERO, 0),
            timestamp,
        )
    }
}
