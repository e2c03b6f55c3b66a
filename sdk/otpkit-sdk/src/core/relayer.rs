use async_trait::async_trait;
use otpkit_state::{Address, WalletConfig};
use serde::{Deserialize, Serialize};
use std::error::Error;

/// Reply of the deployment service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentResponse {
    pub address: Address,
}

/// Remote service that deploys wallets on the client's behalf.
#[async_trait]
pub trait Relayer: Send + Sync {
    async fn create_wallet(
        &self,
        config: &WalletConfig,
    ) -> Result<DeploymentResponse, Box<dyn Error + Send + Sync>>;
}
