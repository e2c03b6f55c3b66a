use otpkit_program::{AuthorizationRequest, OperationParams};
use otpkit_state::Address;

use crate::advanced::instructions::{self, OtpCodes};
use crate::basic::wallet::OtpWallet;
use crate::config::ClientConfig;
use crate::deploy::WalletSetup;
use crate::error::{OtpSdkError, Result};
use crate::otp::parse_code;
use crate::tree::ProofTree;
use crate::utils::unix_now;

pub struct CreateWalletBuilder {
    name: String,
    tree: Option<ProofTree>,
    last_resort_address: Option<String>,
    spending_limit: u128,
    spending_interval: u64,
    double_otp: bool,
    predicted_address: Option<Address>,
}

impl CreateWalletBuilder {
    pub fn new(name: impl Into<String>, config: &ClientConfig) -> Self {
        Self {
            name: name.into(),
            tree: None,
            last_resort_address: config.default_recovery_address.map(|a| a.to_string()),
            spending_limit: config.spending_limit,
            spending_interval: config.spending_interval,
            double_otp: false,
            predicted_address: None,
        }
    }

    pub fn with_tree(mut self, tree: ProofTree) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn with_last_resort_address(mut self, address: impl Into<String>) -> Self {
        self.last_resort_address = Some(address.into());
        self
    }

    pub fn with_spending_limit(mut self, limit: u128) -> Self {
        self.spending_limit = limit;
        self
    }

    pub fn with_spending_interval(mut self, interval: u64) -> Self {
        self.spending_interval = interval;
        self
    }

    pub fn with_double_otp(mut self, double_otp: bool) -> Self {
        self.double_otp = double_otp;
        self
    }

    pub fn with_predicted_address(mut self, address: Address) -> Self {
        self.predicted_address = Some(address);
        self
    }

    pub fn build(self) -> Result<WalletSetup> {
        let last_resort_address = self
            .last_resort_address
            .ok_or_else(|| OtpSdkError::Validation("last resort address required".into()))?;
        Ok(WalletSetup {
            name: self.name,
            tree: self.tree,
            last_resort_address,
            spending_limit: self.spending_limit,
            spending_interval: self.spending_interval,
            double_otp: self.double_otp,
            predicted_address: self.predicted_address,
        })
    }
}

/// Builds one authorization request for an [`OtpWallet`].
pub struct OperationBuilder<'a> {
    wallet: &'a OtpWallet,
    params: OperationParams,
    code: Option<u32>,
    second_code: Option<u32>,
    sub_index: u8,
    timestamp: Option<u64>,
}

impl<'a> OperationBuilder<'a> {
    pub fn new(wallet: &'a OtpWallet, params: OperationParams) -> Self {
        Self {
            wallet,
            params,
            code: None,
            second_code: None,
            sub_index: 0,
            timestamp: None,
        }
    }

    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_second_code(mut self, code: u32) -> Self {
        self.second_code = Some(code);
        self
    }

    /// Parses codes as typed by the user.
    pub fn with_typed_codes(mut self, code: &str, second_code: Option<&str>) -> Result<Self> {
        self.code = Some(parse_code(code)?);
        self.second_code = second_code.map(parse_code).transpose()?;
        Ok(self)
    }

    /// Which of the slot's authorizations to use.
    pub fn with_sub_index(mut self, sub_index: u8) -> Self {
        self.sub_index = sub_index;
        self
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.params.data = data;
        self
    }

    /// Defaults to the current time.
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(self) -> Result<AuthorizationRequest> {
        let code = self
            .code
            .ok_or_else(|| OtpSdkError::Validation("one-time code required".into()))?;
        let codes = OtpCodes {
            code,
            second_code: self.second_code,
        };
        instructions::build_request(
            self.wallet.record(),
            self.wallet.layers(),
            self.params,
            codes,
            self.sub_index,
            self.timestamp.unwrap_or_else(unix_now),
        )
    }
}
