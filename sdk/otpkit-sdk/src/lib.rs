//! OtpKit SDK
//!
//! Client side of the one-time-password wallet: seed generation, proof-tree
//! construction off the interactive path, address prediction, deployment
//! through a relayer, authenticator export and construction of authorization
//! requests from stored trees.

pub mod address;
pub mod advanced;
pub mod basic;
pub mod config;
pub mod core;
pub mod deploy;
pub mod error;
pub mod export;
pub mod otp;
pub mod seed;
pub mod tree;
pub mod types;
pub mod utils;

pub use crate::address::{identification_key, predict_address};
pub use crate::basic::actions::{CreateWalletBuilder, OperationBuilder};
pub use crate::basic::create::{PendingWallet, WalletCreation};
pub use crate::basic::wallet::OtpWallet;
pub use crate::config::ClientConfig;
pub use crate::core::relayer::{DeploymentResponse, Relayer};
pub use crate::core::store::{FileTreeStore, MemoryTreeStore, TreeStore};
pub use crate::deploy::{DeploymentCoordinator, WalletSetup};
pub use crate::error::{OtpSdkError, Result};
pub use crate::seed::{Seed, SeedPair};
pub use crate::tree::{build_tree, Layers, ProofTree, TreeBuildSession, TreeParams};
pub use crate::types::WalletRecord;

pub mod program {
    pub use otpkit_program::{
        AuthorizationRequest, Chain, Effect, OperationParams, OperationType, OtpKitError, Receipt,
    };
}
