// Example: creating an OtpKit wallet against an in-memory chain
//
// This example demonstrates how to:
// 1. Generate seeds and build the proof tree in the background
// 2. Predict the wallet address while the tree builds
// 3. Deploy through a relayer and persist the tree layers
// 4. Authorize a transfer with the current one-time code

use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use otpkit_program::{Chain, Ledger};
use otpkit_sdk::core::relayer::{DeploymentResponse, Relayer};
use otpkit_sdk::otp::TotpGenerator;
use otpkit_sdk::tree::BuildUpdate;
use otpkit_sdk::utils::unix_now;
use otpkit_sdk::{ClientConfig, CreateWalletBuilder, MemoryTreeStore, OtpWallet, WalletCreation};
use otpkit_state::{keccak256, Address, WalletConfig};
use tokio::sync::Mutex;

struct LocalRelayer {
    chain: Arc<Mutex<Chain>>,
}

#[async_trait]
impl Relayer for LocalRelayer {
    async fn create_wallet(
        &self,
        config: &WalletConfig,
    ) -> Result<DeploymentResponse, Box<dyn Error + Send + Sync>> {
        let address = self
            .chain
            .lock()
            .await
            .deploy_wallet(config.clone(), unix_now())?;
        Ok(DeploymentResponse { address })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ClientConfig {
        // One hour keeps the example fast.
        duration: 3600,
        deployer: Address([0xde; 20]),
        wallet_code_hash: keccak256(b"otpkit wallet code"),
        ..ClientConfig::default()
    };
    let chain = Arc::new(Mutex::new(Chain::new(config.deployer, config.wallet_code_hash)));
    let relayer = LocalRelayer {
        chain: chain.clone(),
    };

    // 1. Seeds and background build
    let mut creation = WalletCreation::start(config, relayer, MemoryTreeStore::new())?;
    let pending = creation.prepare(false, unix_now())?;

    // 2. Address is known before the tree is
    println!("Predicted address: {}", pending.predicted_address);
    let export = creation.export(&pending, "example")?;
    println!("Scan into your authenticator: {}", export.primary);

    let tree = loop {
        match creation.next_update().await {
            Some(BuildUpdate::Progress(p)) => println!("  {} {}/{}", p.stage, p.current, p.total),
            Some(BuildUpdate::Done(tree)) => break *tree,
            Some(BuildUpdate::Failed(reason)) => return Err(reason.into()),
            None => return Err("no build pending".into()),
        }
    };

    // 3. Deploy
    let setup = CreateWalletBuilder::new("example", creation.config())
        .with_tree(tree)
        .with_last_resort_address("0x00000000000000000000000000000000000000aa")
        .with_predicted_address(pending.predicted_address)
        .build()?;
    let record = creation.deploy(&setup).await?;
    println!("Deployed at {}", record.address);

    // 4. Spend with the current code
    let wallet = OtpWallet::load(record.clone(), creation.coordinator().store())?;
    let now = unix_now().max(record.effective_time);
    let code = TotpGenerator::for_seed(&pending.seeds.primary, record.interval)?.code_at(now);
    let request = wallet
        .transfer(Address([0xbb; 20]), 1_000)
        .with_code(code)
        .at(now)
        .build()?;

    let mut chain = chain.lock().await;
    chain.fund(&record.address, 10_000);
    let receipt = chain.execute(&record.address, &request)?;
    println!("Nonce {}: {:?}", receipt.nonce, receipt.effects);
    println!("Wallet balance: {}", chain.balance_of(&record.address));
    drop(chain);

    creation.close().await?;
    Ok(())
}
