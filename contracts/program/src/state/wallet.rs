//! Per-wallet authorization state.
//!
//! Fields are private and the setters are crate-visible: the only way to
//! change a deployed wallet is an accepted operation through
//! [`crate::processor::process_operation`].

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use otpkit_spend_limit_policy::{SpendLimitBuilder, SpendLimitConfig, SpendLimitState};
use otpkit_state::{Address, Hash, WalletConfig};

use crate::error::OtpKitError;

/// Identifies a consumed one-time proof: slot counter and sub-index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct CommitKey {
    pub counter: u64,
    pub sub_index: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct WalletState {
    nonce: u64,
    last_operation_time: u64,
    /// Consumed proofs, keyed by slot; value is the commitment they authorized
    commits: BTreeMap<CommitKey, Hash>,
    forward_address: Option<Address>,
    recovery_address: Option<Address>,
    spending: SpendLimitState,
    /// Set once the recovery leaf has been revealed
    recovery_leaf_spent: bool,
    /// Set by RECOVER; the wallet only forwards from then on
    recovered: bool,
}

impl WalletState {
    fn new(config: &WalletConfig, deployed_at: u64) -> Self {
        let recovery = Some(config.last_resort_address).filter(|a| !a.is_zero());
        Self {
            nonce: 0,
            last_operation_time: 0,
            commits: BTreeMap::new(),
            forward_address: None,
            recovery_address: recovery,
            spending: SpendLimitBuilder::new()
                .limit(config.spending_limit)
                .interval(config.spending_interval)
                .build_state(deployed_at),
            recovery_leaf_spent: false,
            recovered: false,
        }
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn last_operation_time(&self) -> u64 {
        self.last_operation_time
    }

    pub fn forward_address(&self) -> Option<Address> {
        self.forward_address
    }

    pub fn recovery_address(&self) -> Option<Address> {
        self.recovery_address
    }

    pub fn spending(&self) -> &SpendLimitState {
        &self.spending
    }

    pub fn recovery_leaf_spent(&self) -> bool {
        self.recovery_leaf_spent
    }

    pub fn is_recovered(&self) -> bool {
        self.recovered
    }

    pub fn is_committed(&self, key: &CommitKey) -> bool {
        self.commits.contains_key(key)
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// Bumps the nonce and operation time, records the commitment and drops
    /// commits from slots before `key.counter`, which later timestamps can
    /// no longer reach.
    pub(crate) fn advance(
        &mut self,
        timestamp: u64,
        commit: Option<(CommitKey, Hash)>,
    ) -> Result<(), OtpKitError> {
        self.nonce = self.nonce.checked_add(1).ok_or(OtpKitError::NonceOverflow)?;
        self.last_operation_time = timestamp;
        if let Some((key, commitment)) = commit {
            self.commits = self.commits.split_off(&CommitKey {
                counter: key.counter,
                sub_index: 0,
            });
            self.commits.insert(key, commitment);
        }
        Ok(())
    }

    pub(crate) fn spend_recovery_leaf(&mut self) {
        self.recovery_leaf_spent = true;
    }

    pub(crate) fn mark_recovered(&mut self) {
        self.recovered = true;
    }

    pub(crate) fn set_forward_address(&mut self, address: Address) {
        self.forward_address = Some(address);
    }

    pub(crate) fn set_recovery_address(&mut self, address: Address) {
        self.recovery_address = Some(address);
    }

    pub(crate) fn set_spending(&mut self, spending: SpendLimitState) {
        self.spending = spending;
    }
}

/// A deployed wallet: its address, immutable configuration and state.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct WalletAccount {
    address: Address,
    config: WalletConfig,
    state: WalletState,
}

impl WalletAccount {
    /// Creates the wallet with nonce 0, the last resort address as recovery
    /// address and no forwarding.
    pub fn deploy(
        address: Address,
        config: WalletConfig,
        deployed_at: u64,
    ) -> Result<Self, OtpKitError> {
        config.validate()?;
        let state = WalletState::new(&config, deployed_at);
        Ok(Self {
            address,
            config,
            state,
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    pub fn spend_limit(&self) -> SpendLimitConfig {
        SpendLimitBuilder::new()
            .limit(self.config.spending_limit)
            .interval(self.config.spending_interval)
            .build()
    }

    pub(crate) fn commit(&mut self, state: WalletState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(last_resort: Address) -> WalletConfig {
        WalletConfig {
            root: [1u8; 32],
            identification_keys: vec!["k".into()],
            inner_cores: vec![],
            height: 3,
            interval: 30,
            t0: 10,
            lifespan: 3,
            slot_size: 1,
            last_resort_address: last_resort,
            spending_limit: 100,
            spending_interval: 60,
        }
    }

    #[test]
    fn deploy_initial_state() {
        let w = WalletAccount::deploy(Address([5u8; 20]), config(Address([6u8; 20])), 125).unwrap();
        assert_eq!(w.state().nonce(), 0);
        assert_eq!(w.state().recovery_address(), Some(Address([6u8; 20])));
        assert_eq!(w.state().forward_address(), None);
        assert_eq!(w.state().spending().current_window_start, 120);
    }

    #[test]
    fn zero_last_resort_leaves_recovery_unset() {
        let w = WalletAccount::deploy(Address([5u8; 20]), config(Address::ZERO), 0).unwrap();
        assert_eq!(w.state().recovery_address(), None);
    }

    #[test]
    fn deploy_rejects_inconsistent_config() {
        let mut c = config(Address::ZERO);
        c.lifespan = 4;
        assert_eq!(
            WalletAccount::deploy(Address([5u8; 20]), c, 0),
            Err(OtpKitError::InvalidConfig)
        );
    }

    #[test]
    fn advance_prunes_older_slots() {
        let w = WalletAccount::deploy(Address([5u8; 20]), config(Address::ZERO), 0).unwrap();
        let mut s = w.state().clone();
        let k1 = CommitKey { counter: 10, sub_index: 0 };
        let k2 = CommitKey { counter: 10, sub_index: 1 };
        let k3 = CommitKey { counter: 12, sub_index: 0 };
        s.advance(300, Some((k1, [0u8; 32]))).unwrap();
        s.advance(301, Some((k2, [0u8; 32]))).unwrap();
        assert_eq!(s.commit_count(), 2);
        s.advance(360, Some((k3, [0u8; 32]))).unwrap();
        assert_eq!(s.commit_count(), 1);
        assert!(s.is_committed(&k3));
        assert!(!s.is_committed(&k1));
        assert_eq!(s.nonce(), 3);
        assert_eq!(s.last_operation_time(), 360);
    }
}
