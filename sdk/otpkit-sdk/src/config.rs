//! Client configuration with defaults.

use std::path::{Path, PathBuf};

use otpkit_state::{Address, Hash, MAX_TREE_HEIGHT};
use serde::{Deserialize, Serialize};

use crate::core::constants::{
    AUTHENTICATOR_PERIOD, DEFAULT_DURATION, DEFAULT_INTERVAL, DEFAULT_ISSUER, DEFAULT_SLOT_SIZE,
    DEFAULT_SPENDING_INTERVAL, DEFAULT_SPENDING_LIMIT,
};
use crate::error::{OtpSdkError, Result};

/// Parameters the client uses when creating and deploying wallets.
///
/// Every field has a default, so a configuration file only needs to list the
/// values it overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Seconds per one-time code. Only the authenticator period is accepted.
    pub interval: u32,

    /// Seconds covered by a new wallet's proof tree.
    pub duration: u64,

    /// Authorizations per time slot.
    pub slot_size: u8,

    /// Number of inner trees built next to the primary tree.
    pub inner_tree_count: u32,

    /// Per-window spending cap in base units.
    #[serde(with = "otpkit_state::encoding::amount")]
    pub spending_limit: u128,

    /// Spending window length in seconds.
    pub spending_interval: u64,

    /// Used when the user gives no last resort address.
    pub default_recovery_address: Option<Address>,

    /// Factory contract deploying wallets.
    pub deployer: Address,

    /// Hash of the wallet contract code the factory deploys.
    #[serde(with = "otpkit_state::encoding::hash_hex")]
    pub wallet_code_hash: Hash,

    /// Issuer shown in authenticator apps.
    pub issuer: String,

    /// Directory of the file tree store; in-memory when unset.
    pub store_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            duration: DEFAULT_DURATION,
            slot_size: DEFAULT_SLOT_SIZE,
            inner_tree_count: 0,
            spending_limit: DEFAULT_SPENDING_LIMIT,
            spending_interval: DEFAULT_SPENDING_INTERVAL,
            default_recovery_address: None,
            deployer: Address::ZERO,
            wallet_code_hash: [0u8; 32],
            issuer: DEFAULT_ISSUER.to_string(),
            store_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval != AUTHENTICATOR_PERIOD {
            return Err(OtpSdkError::Config(format!(
                "interval must be {AUTHENTICATOR_PERIOD} seconds, got {}",
                self.interval
            )));
        }
        if self.duration == 0 || self.duration % self.interval as u64 != 0 {
            return Err(OtpSdkError::Config(
                "duration must be a positive multiple of interval".into(),
            ));
        }
        if self.slot_size == 0 {
            return Err(OtpSdkError::Config("slot_size must be positive".into()));
        }
        let leaves = (self.duration / self.interval as u64)
            .saturating_mul(self.slot_size as u64)
            .saturating_add(1);
        if leaves > 1u64 << (MAX_TREE_HEIGHT - 1) {
            return Err(OtpSdkError::Config("duration too long for one tree".into()));
        }
        if self.issuer.trim().is_empty() {
            return Err(OtpSdkError::Config("issuer must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"slot_size": 3, "spending_limit": "5000"}"#).unwrap();
        let config = ClientConfig::from_json_file(&path).unwrap();
        assert_eq!(config.slot_size, 3);
        assert_eq!(config.spending_limit, 5000);
        assert_eq!(config.interval, DEFAULT_INTERVAL);
    }

    #[test]
    fn rejects_interval_authenticators_cannot_follow() {
        for interval in [0, 15, 60] {
            let config = ClientConfig {
                interval,
                ..ClientConfig::default()
            };
            assert!(matches!(config.validate(), Err(OtpSdkError::Config(_))));
        }
    }

    #[test]
    fn file_with_other_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"interval": 60, "duration": 3600}"#).unwrap();
        assert!(matches!(
            ClientConfig::from_json_file(&path),
            Err(OtpSdkError::Config(_))
        ));
    }

    #[test]
    fn rejects_misaligned_duration() {
        let config = ClientConfig {
            duration: 45,
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(OtpSdkError::Config(_))));
    }
}
