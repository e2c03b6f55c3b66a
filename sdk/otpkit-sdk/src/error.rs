use otpkit_program::OtpKitError;
use otpkit_state::{Address, OtpStateError};
use thiserror::Error;

/// SDK-specific error types for OtpKit operations
#[derive(Debug, Error)]
pub enum OtpSdkError {
    /// Malformed input rejected before any side effect
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Deployment attempted before the proof tree was built
    #[error("Proof tree is missing")]
    MissingTree,

    /// Tree layers and parameters disagree
    #[error("Inconsistent proof tree: {0}")]
    InconsistentTree(String),

    /// Relayer rejected or failed the deployment; safe to retry
    #[error("Deployment failed: {0}")]
    Deployment(String),

    #[error("A deployment is already in flight")]
    DeploymentInProgress,

    /// Wallet was deployed but its layers could not be stored
    #[error("Wallet {address} deployed but tree persistence failed: {reason}")]
    Persistence { address: Address, reason: String },

    #[error("Tree store error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tree worker error: {0}")]
    Worker(String),

    /// One-time code does not match the expected leaf
    #[error("One-time code does not match")]
    CodeMismatch,

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authenticator export error: {0}")]
    Export(String),

    /// Rejection from the authorizer
    #[error("Program error: {0}")]
    Program(#[from] OtpKitError),
}

impl From<OtpStateError> for OtpSdkError {
    fn from(e: OtpStateError) -> Self {
        match e {
            OtpStateError::InvalidAddress(raw) => OtpSdkError::InvalidAddress(raw),
            other => OtpSdkError::InconsistentTree(other.to_string()),
        }
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, OtpSdkError>;
