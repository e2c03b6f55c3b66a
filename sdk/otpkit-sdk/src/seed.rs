//! Seed Generator

use std::fmt;

use otpkit_state::{keccak256, Hash};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::constants::SEED_LEN;

/// Secret an authenticator app derives one-time codes from.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    pub fn generate() -> Self {
        let mut bytes = [0u8; SEED_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }

    /// Hash of the seed kept by the client after the seed is exported.
    pub fn hseed(&self) -> Hash {
        keccak256(&self.0)
    }

    pub fn to_base32(&self) -> String {
        data_encoding::BASE32_NOPAD.encode(&self.0)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}

/// Primary seed plus the optional second factor.
#[derive(Clone, Debug)]
pub struct SeedPair {
    pub primary: Seed,
    pub secondary: Option<Seed>,
}

impl SeedPair {
    pub fn generate(double_otp: bool) -> Self {
        Self {
            primary: Seed::generate(),
            secondary: double_otp.then(Seed::generate),
        }
    }

    pub fn is_double_otp(&self) -> bool {
        self.secondary.is_some()
    }
}
