//! In-memory chain hosting deployed wallets.
//!
//! Holds balances for plain accounts and wallets alike, deploys wallets at
//! deterministic addresses and relays payments received by a wallet that
//! has a forward address set.

use std::collections::{HashMap, HashSet};

use otpkit_state::{create2_address, identification_salt, Address, Hash, WalletConfig};
use tracing::{debug, info};

use crate::effect::{Effect, Receipt};
use crate::error::OtpKitError;
use crate::instruction::AuthorizationRequest;
use crate::ledger::{Ledger, TransferFailure};
use crate::processor;
use crate::state::WalletAccount;
use crate::MAX_FORWARD_DEPTH;

#[derive(Debug, Clone)]
pub struct Chain {
    deployer: Address,
    code_hash: Hash,
    balances: HashMap<Address, u128>,
    wallets: HashMap<Address, WalletAccount>,
    refusing: HashSet<Address>,
}

impl Chain {
    pub fn new(deployer: Address, code_hash: Hash) -> Self {
        Self {
            deployer,
            code_hash,
            balances: HashMap::new(),
            wallets: HashMap::new(),
            refusing: HashSet::new(),
        }
    }

    pub fn deployer(&self) -> &Address {
        &self.deployer
    }

    pub fn code_hash(&self) -> &Hash {
        &self.code_hash
    }

    /// Address a configuration deploys to.
    pub fn address_for(&self, config: &WalletConfig) -> Result<Address, OtpKitError> {
        let key = config
            .identification_keys
            .first()
            .ok_or(OtpKitError::InvalidConfig)?;
        Ok(create2_address(
            &self.deployer,
            &identification_salt(key),
            &self.code_hash,
        ))
    }

    /// Deploys a wallet. Re-deploying an identical configuration returns the
    /// existing address.
    pub fn deploy_wallet(
        &mut self,
        config: WalletConfig,
        now: u64,
    ) -> Result<Address, OtpKitError> {
        config.validate()?;
        let address = self.address_for(&config)?;
        if let Some(existing) = self.wallets.get(&address) {
            if existing.config() == &config {
                return Ok(address);
            }
            return Err(OtpKitError::AlreadyDeployed);
        }
        let account = WalletAccount::deploy(address, config, now)?;
        self.wallets.insert(address, account);
        info!(%address, "wallet deployed");
        Ok(address)
    }

    pub fn wallet(&self, address: &Address) -> Option<&WalletAccount> {
        self.wallets.get(address)
    }

    /// Credits `amount` out of thin air.
    pub fn fund(&mut self, address: &Address, amount: u128) {
        let balance = self.balances.entry(*address).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Makes every later payment to `address` fail.
    pub fn refuse_payments(&mut self, address: &Address) {
        self.refusing.insert(*address);
    }

    /// Plain payment from any account, with the same receipt handling as
    /// wallet-initiated transfers.
    pub fn send(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<Vec<Effect>, TransferFailure> {
        self.move_funds(from, to, amount, 0)
    }

    /// Runs one operation attempt against the wallet at `address`.
    pub fn execute(
        &mut self,
        address: &Address,
        request: &AuthorizationRequest,
    ) -> Result<Receipt, OtpKitError> {
        let mut account = self
            .wallets
            .remove(address)
            .ok_or(OtpKitError::UnknownWallet)?;
        let outcome = processor::process_operation(&mut account, self, request);
        self.wallets.insert(*address, account);
        outcome
    }

    fn move_funds(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        depth: usize,
    ) -> Result<Vec<Effect>, TransferFailure> {
        if depth > MAX_FORWARD_DEPTH {
            return Err(TransferFailure::ForwardLoop(MAX_FORWARD_DEPTH));
        }
        if self.refusing.contains(to) {
            return Err(TransferFailure::Rejected(*to));
        }
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(TransferFailure::InsufficientBalance {
                from: *from,
                balance,
                amount,
            });
        }
        if from == to {
            return Ok(Vec::new());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TransferFailure::Overflow(*to))?;

        self.balances.insert(*from, balance - amount);
        self.balances.insert(*to, credited);

        // Receipt hook: a forwarding wallet passes the payment on, unless it
        // came from the forward address itself.
        let forward = self
            .wallets
            .get(to)
            .and_then(|w| w.state().forward_address())
            .filter(|f| f != from);
        let Some(forward) = forward else {
            return Ok(Vec::new());
        };
        match self.move_funds(to, &forward, amount, depth + 1) {
            Ok(relayed) => {
                debug!(wallet = %to, dest = %forward, amount, "payment forwarded");
                let mut effects = vec![Effect::PaymentForwarded {
                    wallet: *to,
                    dest: forward,
                    amount,
                }];
                effects.extend(relayed);
                Ok(effects)
            },
            Err(e) => {
                self.balances.insert(*to, credited - amount);
                self.balances.insert(*from, balance);
                Err(e)
            },
        }
    }
}

impl Ledger for Chain {
    fn balance_of(&self, address: &Address) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<Vec<Effect>, TransferFailure> {
        self.move_funds(from, to, amount, 0)
    }
}
