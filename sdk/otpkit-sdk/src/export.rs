//! Authenticator app export.
//!
//! Produces `otpauth://` URIs for single accounts and `otpauth-migration://`
//! URIs carrying a protobuf `MigrationPayload`, the format authenticator apps
//! use for bulk transfer.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use otpkit_state::Address;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use prost::Message;

use crate::core::constants::AUTHENTICATOR_PERIOD;
use crate::error::{OtpSdkError, Result};
use crate::seed::{Seed, SeedPair};

const MIGRATION_PREFIX: &str = "otpauth-migration://offline?data=";

#[derive(Clone, PartialEq, Message)]
pub struct MigrationPayload {
    #[prost(message, repeated, tag = "1")]
    pub otp_parameters: Vec<OtpParameters>,
    #[prost(int32, tag = "2")]
    pub version: i32,
    #[prost(int32, tag = "3")]
    pub batch_size: i32,
    #[prost(int32, tag = "4")]
    pub batch_index: i32,
    #[prost(int32, tag = "5")]
    pub batch_id: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct OtpParameters {
    #[prost(bytes = "vec", tag = "1")]
    pub secret: Vec<u8>,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub issuer: String,
    #[prost(enumeration = "Algorithm", tag = "4")]
    pub algorithm: i32,
    #[prost(enumeration = "DigitCount", tag = "5")]
    pub digits: i32,
    #[prost(enumeration = "OtpType", tag = "6")]
    pub r#type: i32,
    #[prost(int64, tag = "7")]
    pub counter: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum Algorithm {
    Unspecified = 0,
    Sha1 = 1,
    Sha256 = 2,
    Sha512 = 3,
    Md5 = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum DigitCount {
    Unspecified = 0,
    Six = 1,
    Eight = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum OtpType {
    Unspecified = 0,
    Hotp = 1,
    Totp = 2,
}

impl OtpParameters {
    pub fn totp(seed: &Seed, name: &str, issuer: &str) -> Self {
        Self {
            secret: seed.as_bytes().to_vec(),
            name: name.to_string(),
            issuer: issuer.to_string(),
            algorithm: Algorithm::Sha1 as i32,
            digits: DigitCount::Six as i32,
            r#type: OtpType::Totp as i32,
            counter: 0,
        }
    }
}

/// Single-account URI for codes rotating every `period` seconds.
pub fn otpauth_uri(seed: &Seed, name: &str, issuer: &str, period: u32) -> String {
    let label = format!("{issuer}:{name}");
    format!(
        "otpauth://totp/{}?secret={}&issuer={}&algorithm=SHA1&digits=6&period={}",
        utf8_percent_encode(&label, NON_ALPHANUMERIC),
        seed.to_base32(),
        utf8_percent_encode(issuer, NON_ALPHANUMERIC),
        period,
    )
}

pub fn migration_uri(accounts: Vec<OtpParameters>) -> String {
    let payload = MigrationPayload {
        batch_size: 1,
        version: 1,
        otp_parameters: accounts,
        ..Default::default()
    };
    let data = STANDARD.encode(payload.encode_to_vec());
    format!(
        "{MIGRATION_PREFIX}{}",
        utf8_percent_encode(&data, NON_ALPHANUMERIC)
    )
}

pub fn decode_migration_uri(uri: &str) -> Result<MigrationPayload> {
    let encoded = uri
        .strip_prefix(MIGRATION_PREFIX)
        .ok_or_else(|| OtpSdkError::Export("not a migration URI".into()))?;
    let data = percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|e| OtpSdkError::Export(e.to_string()))?;
    let bytes = STANDARD
        .decode(data.as_bytes())
        .map_err(|e| OtpSdkError::Export(e.to_string()))?;
    MigrationPayload::decode(bytes.as_slice()).map_err(|e| OtpSdkError::Export(e.to_string()))
}

/// Migration URIs for each factor of a new wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorExport {
    pub primary: String,
    pub secondary: Option<String>,
}

/// Display names carry the wallet address so entries can be told apart in
/// the authenticator. Migration payloads have no period field, so trees with
/// any other interval cannot be exported this way.
pub fn export_seeds(
    seeds: &SeedPair,
    name: &str,
    issuer: &str,
    address: &Address,
    interval: u32,
) -> Result<AuthenticatorExport> {
    if interval != AUTHENTICATOR_PERIOD {
        return Err(OtpSdkError::Export(format!(
            "authenticator apps assume {AUTHENTICATOR_PERIOD}s codes, tree uses {interval}s"
        )));
    }
    let primary_name = format!("{name} [{address}]");
    let secondary = seeds.secondary.as_ref().map(|seed| {
        let display = format!("{name} (2nd) [{address}]");
        migration_uri(vec![OtpParameters::totp(seed, &display, issuer)])
    });
    Ok(AuthenticatorExport {
        primary: migration_uri(vec![OtpParameters::totp(&seeds.primary, &primary_name, issuer)]),
        secondary,
    })
}
