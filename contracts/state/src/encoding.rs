//! Serde adapters for JSON-facing wallet data.

use core::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::OtpStateError;
use crate::hash::Hash;

/// Parses a 32-byte hash from `0x`-prefixed or bare hex.
pub fn parse_hash(input: &str) -> Result<Hash, OtpStateError> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    let bytes = hex::decode(digits).map_err(|_| OtpStateError::InvalidHash(input.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| OtpStateError::InvalidHash(input.to_string()))
}

/// `0x`-prefixed hex for 32-byte hashes.
pub mod hash_hex {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_hash(&raw).map_err(de::Error::custom)
    }
}

/// Base-unit amounts as decimal strings; plain integers are accepted on input.
pub mod amount {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(v as u128)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.parse::<u128>().map_err(E::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        #[serde(with = "amount")]
        value: u128,
        #[serde(with = "hash_hex")]
        root: Hash,
    }

    #[test]
    fn amount_accepts_string_and_number() {
        let from_str: Sample = serde_json::from_str(&format!(
            r#"{{"value":"10000000000000000","root":"0x{}"}}"#,
            "11".repeat(32)
        ))
        .unwrap();
        assert_eq!(from_str.value, 10_000_000_000_000_000);
        assert_eq!(from_str.root, [0x11; 32]);

        let from_num: Sample =
            serde_json::from_str(&format!(r#"{{"value":42,"root":"{}"}}"#, "22".repeat(32)))
                .unwrap();
        assert_eq!(from_num.value, 42);
    }

    #[test]
    fn amount_serializes_as_string() {
        let s = Sample {
            value: u128::MAX,
            root: [0u8; 32],
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains(&format!("\"{}\"", u128::MAX)));
    }

    #[test]
    fn parse_hash_rejects_wrong_length() {
        assert!(parse_hash("0x1234").is_err());
        assert!(parse_hash(&"g".repeat(64)).is_err());
    }
}
