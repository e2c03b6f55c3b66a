#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use otpkit_program::Chain;
use otpkit_sdk::core::relayer::{DeploymentResponse, Relayer};
use otpkit_sdk::core::store::StoreError;
use otpkit_sdk::otp::TotpGenerator;
use otpkit_sdk::{ClientConfig, Layers, Seed, SeedPair, TreeParams, TreeStore};
use otpkit_state::{keccak256, Address, WalletConfig};
use tokio::sync::{Mutex, Notify};

pub const INTERVAL: u32 = 30;
/// Aligned to six intervals, as the client aligns effective times.
pub const EFFECTIVE_TIME: u64 = 1_699_999_920;
/// Eight slots.
pub const DURATION: u64 = 240;
pub const SLOT_SIZE: u8 = 2;
pub const ONE_ETH: u128 = 1_000_000_000_000_000_000;

pub fn addr(tag: u8) -> Address {
    Address([tag; 20])
}

pub fn deployer() -> Address {
    addr(0xde)
}

pub fn code_hash() -> [u8; 32] {
    keccak256(b"otpkit wallet code")
}

pub fn client_config() -> ClientConfig {
    ClientConfig {
        interval: INTERVAL,
        duration: DURATION,
        slot_size: SLOT_SIZE,
        inner_tree_count: 1,
        spending_limit: ONE_ETH,
        spending_interval: 60,
        default_recovery_address: None,
        deployer: deployer(),
        wallet_code_hash: code_hash(),
        ..ClientConfig::default()
    }
}

pub fn fixed_seeds(double_otp: bool) -> SeedPair {
    SeedPair {
        primary: Seed::from_bytes([0x5a; 20]),
        secondary: double_otp.then(|| Seed::from_bytes([0xa5; 20])),
    }
}

pub fn tree_params(seeds: &SeedPair, inner_tree_count: u32) -> TreeParams {
    TreeParams {
        seed: seeds.primary.clone(),
        seed2: seeds.secondary.clone(),
        effective_time: EFFECTIVE_TIME,
        duration: DURATION,
        interval: INTERVAL,
        slot_size: SLOT_SIZE,
        inner_tree_count,
    }
}

pub fn code_at(seed: &Seed, time: u64) -> u32 {
    TotpGenerator::for_seed(seed, INTERVAL)
        .expect("hmac key")
        .code_at(time)
}

/// Start of the `slot`-th slot of the test tree, plus one second.
pub fn slot_time(slot: u64) -> u64 {
    EFFECTIVE_TIME + slot * INTERVAL as u64 + 1
}

pub fn new_chain() -> Arc<Mutex<Chain>> {
    Arc::new(Mutex::new(Chain::new(deployer(), code_hash())))
}

/// Relayer deploying straight into an in-memory chain.
#[derive(Clone)]
pub struct ChainRelayer {
    pub chain: Arc<Mutex<Chain>>,
    pub now: u64,
    pub calls: Arc<AtomicUsize>,
}

impl ChainRelayer {
    pub fn new(chain: Arc<Mutex<Chain>>) -> Self {
        Self {
            chain,
            now: EFFECTIVE_TIME,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Relayer for ChainRelayer {
    async fn create_wallet(
        &self,
        config: &WalletConfig,
    ) -> Result<DeploymentResponse, Box<dyn std::error::Error + Send + Sync>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let address = self
            .chain
            .lock()
            .await
            .deploy_wallet(config.clone(), self.now)?;
        Ok(DeploymentResponse { address })
    }
}

/// Fails the first `failures` calls, then deploys.
pub struct FlakyRelayer {
    pub inner: ChainRelayer,
    pub failures: AtomicUsize,
}

impl FlakyRelayer {
    pub fn new(inner: ChainRelayer, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl Relayer for FlakyRelayer {
    async fn create_wallet(
        &self,
        config: &WalletConfig,
    ) -> Result<DeploymentResponse, Box<dyn std::error::Error + Send + Sync>> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            self.inner.calls.fetch_add(1, Ordering::SeqCst);
            return Err("relayer unavailable".into());
        }
        self.inner.create_wallet(config).await
    }
}

/// Holds every deployment until the gate is opened.
pub struct GatedRelayer {
    pub inner: ChainRelayer,
    pub gate: Arc<Notify>,
}

#[async_trait]
impl Relayer for GatedRelayer {
    async fn create_wallet(
        &self,
        config: &WalletConfig,
    ) -> Result<DeploymentResponse, Box<dyn std::error::Error + Send + Sync>> {
        self.gate.notified().await;
        self.inner.create_wallet(config).await
    }
}

/// Store whose disk is always full.
pub struct FullDiskStore;

impl TreeStore for FullDiskStore {
    fn put(&self, _root_hex: &str, _layers: &Layers) -> Result<(), StoreError> {
        Err("no space left on device".into())
    }

    fn get(&self, _root_hex: &str) -> Result<Option<Layers>, StoreError> {
        Ok(None)
    }
}
