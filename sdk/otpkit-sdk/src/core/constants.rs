/// Code period authenticator apps assume. Migration exports cannot carry
/// any other.
pub const AUTHENTICATOR_PERIOD: u32 = 30;

/// Seconds per one-time code.
pub const DEFAULT_INTERVAL: u32 = AUTHENTICATOR_PERIOD;

/// Default tree coverage: 364 days.
pub const DEFAULT_DURATION: u64 = 3600 * 24 * 364;

pub const DEFAULT_SLOT_SIZE: u8 = 1;

pub const DEFAULT_SPENDING_LIMIT: u128 = 1_000_000_000_000_000_000;

pub const DEFAULT_SPENDING_INTERVAL: u64 = 86_400;

pub const DEFAULT_ISSUER: &str = "OtpKit";

/// Effective times are aligned to this many intervals.
pub const EFFECTIVE_TIME_ALIGNMENT: u64 = 6;

/// Seed length in bytes.
pub const SEED_LEN: usize = 20;

pub const OTP_DIGITS: u32 = 6;

pub const OTP_MODULUS: u32 = 1_000_000;

pub const RECOVERY_PROOF_TAG: &[u8] = b"recovery";

pub const INNER_TREE_TAG: &[u8] = b"inner";

/// Leaves hashed between two progress reports.
pub const PROGRESS_STEP: usize = 4096;
