use core::fmt;
use core::str::FromStr;

use alloy_primitives::Address as EvmAddress;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::OtpStateError;
use crate::hash::{keccak256, Hash};

/// 20-byte account address. Parsing, formatting and CREATE2 derivation go
/// through `alloy_primitives::Address`; the raw array keeps the borsh layout.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, BorshSerialize, BorshDeserialize,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const LEN: usize = 20;
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn evm(&self) -> EvmAddress {
        EvmAddress::new(self.0)
    }

    /// Parses `0x`-prefixed or bare hex in any letter case. Mixed case is
    /// not checked as an EIP-55 checksum.
    pub fn parse(input: &str) -> Result<Self, OtpStateError> {
        EvmAddress::from_str(input.trim())
            .map(Self::from)
            .map_err(|_| OtpStateError::InvalidAddress(input.to_string()))
    }

    /// Canonical lowercase `0x` form of any accepted spelling.
    pub fn normalize(input: &str) -> Result<String, OtpStateError> {
        Self::parse(input).map(|a| a.to_string())
    }
}

impl From<EvmAddress> for Address {
    fn from(address: EvmAddress) -> Self {
        Self(address.0 .0)
    }
}

impl From<Address> for EvmAddress {
    fn from(address: Address) -> Self {
        address.evm()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.evm())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = OtpStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as Deserialize>::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

//=============================================================================
// Deterministic deployment addresses
//=============================================================================

/// Salt a wallet is deployed under, derived from its first identification key.
pub fn identification_salt(identification_key: &str) -> Hash {
    keccak256(identification_key.as_bytes())
}

/// CREATE2 address of `code_hash` deployed by `deployer` under `salt`.
pub fn create2_address(deployer: &Address, salt: &Hash, code_hash: &Hash) -> Address {
    deployer.evm().create2(salt, code_hash).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_prefix() {
        let a = Address::parse("0xAbCdEf0123456789abcdef0123456789ABCDEF01").unwrap();
        let b = Address::parse("abcdef0123456789abcdef0123456789abcdef01").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(
            Address::normalize(" 0xABCDEF0123456789ABCDEF0123456789ABCDEF01 ").unwrap(),
            "0xabcdef0123456789abcdef0123456789abcdef01"
        );
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(Address::parse("").is_err());
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("0xzz000000000000000000000000000000000000zz").is_err());
        assert!(Address::parse("0x00000000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn zero_address_is_detected() {
        assert!(Address::ZERO.is_zero());
        assert!(Address::parse("0x0000000000000000000000000000000000000000")
            .unwrap()
            .is_zero());
    }

    #[test]
    fn create2_matches_eip1014_vector() {
        // Example 1 of EIP-1014: zero deployer, zero salt, init code 0x00.
        let code_hash = keccak256(&[0x00]);
        let address = create2_address(&Address::ZERO, &[0u8; 32], &code_hash);
        assert_eq!(
            address.to_string(),
            "0x4d1a2e2bb4f88f0250f26ffff098b0b30b26bf38"
        );
    }

    #[test]
    fn serde_uses_hex_string() {
        let a = Address([7u8; 20]);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", a));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn deserialize_rejects_short_address() {
        let err = serde_json::from_str::<Address>("\"0x1234\"");
        assert!(err.is_err());
    }
}
