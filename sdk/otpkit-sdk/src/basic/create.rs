//! Wallet creation flow: seeds, background tree build, address prediction,
//! setup-code verification and a guarded deployment.

use std::sync::atomic::{AtomicBool, Ordering};

use otpkit_state::Address;
use tracing::{debug, info};

use crate::address::predict_address;
use crate::advanced::builders::TreeParamsBuilder;
use crate::config::ClientConfig;
use crate::core::relayer::Relayer;
use crate::core::store::TreeStore;
use crate::deploy::{DeploymentCoordinator, WalletSetup};
use crate::error::{OtpSdkError, Result};
use crate::export::{export_seeds, AuthenticatorExport};
use crate::otp::verify_setup_codes;
use crate::seed::SeedPair;
use crate::tree::{BuildUpdate, ProofTree, Salt, TreeBuildSession};
use crate::types::WalletRecord;
use crate::utils::effective_time_for;

/// A wallet whose tree is being built.
#[derive(Debug, Clone)]
pub struct PendingWallet {
    pub seeds: SeedPair,
    pub effective_time: u64,
    pub predicted_address: Address,
    pub salt: Salt,
}

pub struct WalletCreation<R, S> {
    config: ClientConfig,
    coordinator: DeploymentCoordinator<R, S>,
    session: TreeBuildSession,
    deploying: AtomicBool,
}

/// Clears the deploying flag however the deployment ends.
struct DeployingGuard<'a>(&'a AtomicBool);

impl Drop for DeployingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R: Relayer, S: TreeStore> WalletCreation<R, S> {
    /// Must be called inside a tokio runtime; the tree worker is spawned here.
    pub fn start(config: ClientConfig, relayer: R, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            coordinator: DeploymentCoordinator::new(relayer, store),
            session: TreeBuildSession::start(),
            deploying: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &DeploymentCoordinator<R, S> {
        &self.coordinator
    }

    /// Generates fresh seeds and requests their tree. Any earlier pending
    /// build is superseded.
    pub fn prepare(&mut self, double_otp: bool, now: u64) -> Result<PendingWallet> {
        let seeds = SeedPair::generate(double_otp);
        let effective_time = effective_time_for(now, self.config.interval);
        let params = TreeParamsBuilder::new(&self.config)
            .with_seeds(seeds.clone())
            .with_effective_time(effective_time)
            .build()?;
        let salt = self.session.request(params)?;
        let predicted_address = predict_address(
            &seeds.primary,
            &self.config.deployer,
            &self.config.wallet_code_hash,
        );
        debug!(%predicted_address, effective_time, "wallet prepared");
        Ok(PendingWallet {
            seeds,
            effective_time,
            predicted_address,
            salt,
        })
    }

    pub async fn next_update(&mut self) -> Option<BuildUpdate> {
        self.session.next_update().await
    }

    pub async fn wait_for_tree(&mut self) -> Result<ProofTree> {
        self.session.finish().await
    }

    pub fn verify_codes(&self, pending: &PendingWallet, codes: &[&str], time: u64) -> Result<()> {
        verify_setup_codes(
            &pending.seeds.primary,
            pending.seeds.secondary.as_ref(),
            codes,
            time,
            self.config.interval,
        )
    }

    pub fn export(&self, pending: &PendingWallet, name: &str) -> Result<AuthenticatorExport> {
        export_seeds(
            &pending.seeds,
            name,
            &self.config.issuer,
            &pending.predicted_address,
            self.config.interval,
        )
    }

    pub fn is_deploying(&self) -> bool {
        self.deploying.load(Ordering::Acquire)
    }

    /// Rejects a second call while one deployment is in flight.
    pub async fn deploy(&self, setup: &WalletSetup) -> Result<WalletRecord> {
        if self
            .deploying
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(OtpSdkError::DeploymentInProgress);
        }
        let _guard = DeployingGuard(&self.deploying);
        let record = self.coordinator.deploy(setup).await?;
        info!(address = %record.address, "wallet created");
        Ok(record)
    }

    pub async fn close(self) -> Result<()> {
        self.session.close().await
    }
}
