use thiserror::Error;

/// Errors raised while parsing or validating shared wallet data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpStateError {
    /// Address is not 20 bytes of hex
    #[error("Malformed address: {0}")]
    InvalidAddress(String),

    /// Hash is not 32 bytes of hex
    #[error("Malformed hash: {0}")]
    InvalidHash(String),

    /// Tree height outside the supported range
    #[error("Invalid tree height {0}")]
    InvalidHeight(u8),

    #[error("Interval must be positive")]
    ZeroInterval,

    #[error("Lifespan must be positive")]
    ZeroLifespan,

    #[error("Slot size must be positive")]
    ZeroSlotSize,

    /// Tree cannot hold every time slot plus the recovery leaf
    #[error("Tree of height {height} cannot hold {required} leaves")]
    TreeTooSmall { height: u8, required: u64 },

    #[error("At least one identification key is required")]
    MissingIdentificationKey,
}
