//! Deployment Coordinator
//!
//! Validates a prepared wallet, submits it to the relayer and, only once an
//! address came back, persists the tree layers keyed by hex root.

use otpkit_state::{Address, WalletConfig};
use tracing::{debug, info, warn};

use crate::address::check_deployed_address;
use crate::core::relayer::Relayer;
use crate::core::store::TreeStore;
use crate::error::{OtpSdkError, Result};
use crate::tree::ProofTree;
use crate::types::WalletRecord;

/// Everything the user chose for a new wallet, plus the built tree.
#[derive(Debug, Clone, Default)]
pub struct WalletSetup {
    pub name: String,
    pub tree: Option<ProofTree>,
    /// Raw user input; normalized during validation.
    pub last_resort_address: String,
    pub spending_limit: u128,
    pub spending_interval: u64,
    pub double_otp: bool,
    pub predicted_address: Option<Address>,
}

pub struct DeploymentCoordinator<R, S> {
    relayer: R,
    store: S,
}

impl<R: Relayer, S: TreeStore> DeploymentCoordinator<R, S> {
    pub fn new(relayer: R, store: S) -> Self {
        Self { relayer, store }
    }

    pub fn relayer(&self) -> &R {
        &self.relayer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Builds the deployment request. Fails on malformed input without
    /// touching the relayer or the store.
    pub fn prepare(&self, setup: &WalletSetup) -> Result<WalletConfig> {
        if setup.name.trim().is_empty() {
            return Err(OtpSdkError::Validation("wallet name must not be empty".into()));
        }
        let tree = setup.tree.as_ref().ok_or(OtpSdkError::MissingTree)?;
        let last_resort_address = Address::parse(setup.last_resort_address.trim())?;
        tree.check_consistency()?;

        let mut identification_keys = vec![tree.identification_key()];
        identification_keys.extend(tree.inner_trees.iter().map(|t| t.identification_key()));

        let config = WalletConfig {
            root: tree.root,
            identification_keys,
            inner_cores: tree.inner_cores(),
            height: tree.height(),
            interval: tree.interval,
            t0: tree.t0,
            lifespan: tree.lifespan,
            slot_size: tree.slot_size,
            last_resort_address,
            spending_limit: setup.spending_limit,
            spending_interval: setup.spending_interval,
        };
        config.validate()?;
        Ok(config)
    }

    pub async fn deploy(&self, setup: &WalletSetup) -> Result<WalletRecord> {
        let config = self.prepare(setup)?;
        let tree = setup.tree.as_ref().ok_or(OtpSdkError::MissingTree)?;

        debug!(name = %setup.name, root = %hex::encode(config.root), "submitting wallet");
        let response = self
            .relayer
            .create_wallet(&config)
            .await
            .map_err(|e| {
                warn!(error = %e, "wallet deployment failed");
                OtpSdkError::Deployment(e.to_string())
            })?;
        let address = response.address;
        info!(%address, name = %setup.name, "wallet deployed");

        self.persist(tree, &address)?;

        Ok(WalletRecord {
            name: setup.name.clone(),
            address,
            root: tree.root,
            hseed: tree.hseed,
            effective_time: tree.effective_time(),
            duration: tree.duration(),
            interval: tree.interval,
            height: tree.height(),
            slot_size: tree.slot_size,
            last_resort_address: config.last_resort_address,
            spending_limit: config.spending_limit,
            spending_interval: config.spending_interval,
            identification_keys: config.identification_keys,
            inner_roots: tree
                .inner_trees
                .iter()
                .map(|inner| hex::encode(inner.root))
                .collect(),
            double_otp: setup.double_otp,
            address_matches_prediction: check_deployed_address(
                setup.predicted_address.as_ref(),
                &address,
            ),
        })
    }

    fn persist(&self, tree: &ProofTree, address: &Address) -> Result<()> {
        let primary = std::iter::once(&tree.layers);
        let inner = tree.inner_trees.iter().map(|t| &t.layers);
        for layers in primary.chain(inner) {
            let key = layers
                .root_hex()
                .ok_or_else(|| OtpSdkError::InconsistentTree("layers have no root".into()))?;
            self.store
                .put(&key, layers)
                .map_err(|e| OtpSdkError::Persistence {
                    address: *address,
                    reason: e.to_string(),
                })?;
            debug!(root = %key, "tree layers stored");
        }
        Ok(())
    }
}
