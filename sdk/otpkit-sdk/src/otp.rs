//! Time-step one-time codes (RFC 4226 / RFC 6238, HMAC-SHA1, six digits).

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::core::constants::{OTP_DIGITS, OTP_MODULUS};
use crate::error::{OtpSdkError, Result};
use crate::seed::Seed;
use crate::utils::counter_at;

type HmacSha1 = Hmac<Sha1>;

/// Code generator keyed once with a seed.
#[derive(Clone)]
pub struct TotpGenerator {
    mac: HmacSha1,
    interval: u32,
}

impl TotpGenerator {
    pub fn new(secret: &[u8], interval: u32) -> Result<Self> {
        let mac = HmacSha1::new_from_slice(secret)
            .map_err(|e| OtpSdkError::Crypto(format!("HMAC-SHA1 key init failed: {e}")))?;
        Ok(Self { mac, interval })
    }

    pub fn for_seed(seed: &Seed, interval: u32) -> Result<Self> {
        Self::new(seed.as_bytes(), interval)
    }

    /// HOTP value for `counter`.
    pub fn code_at_counter(&self, counter: u64) -> u32 {
        let mut mac = self.mac.clone();
        mac.update(&counter.to_be_bytes());
        let digest = mac.finalize().into_bytes();
        let offset = (digest[digest.len() - 1] & 0x0f) as usize;
        let binary = u32::from_be_bytes([
            digest[offset] & 0x7f,
            digest[offset + 1],
            digest[offset + 2],
            digest[offset + 3],
        ]);
        binary % OTP_MODULUS
    }

    pub fn code_at(&self, time: u64) -> u32 {
        self.code_at_counter(counter_at(time, self.interval))
    }
}

pub fn hotp(secret: &[u8], counter: u64) -> Result<u32> {
    Ok(TotpGenerator::new(secret, 1)?.code_at_counter(counter))
}

/// Left-zero-padded display form.
pub fn format_code(code: u32) -> String {
    format!("{:0width$}", code, width = OTP_DIGITS as usize)
}

/// Parses a code as typed by the user; spaces are ignored.
pub fn parse_code(input: &str) -> Result<u32> {
    let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != OTP_DIGITS as usize || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(OtpSdkError::Validation(format!(
            "one-time code must be {OTP_DIGITS} digits"
        )));
    }
    digits
        .parse()
        .map_err(|_| OtpSdkError::Validation("one-time code is not a number".into()))
}

/// Setup check: every enabled factor must match its own seed at `time`.
pub fn verify_setup_codes(
    primary: &Seed,
    secondary: Option<&Seed>,
    codes: &[&str],
    time: u64,
    interval: u32,
) -> Result<()> {
    let expected = 1 + secondary.is_some() as usize;
    if codes.len() != expected {
        return Err(OtpSdkError::Validation(format!(
            "expected {expected} one-time codes, got {}",
            codes.len()
        )));
    }
    let seeds = std::iter::once(primary).chain(secondary);
    for (seed, code) in seeds.zip(codes) {
        let entered = parse_code(code)?;
        if TotpGenerator::for_seed(seed, interval)?.code_at(time) != entered {
            return Err(OtpSdkError::CodeMismatch);
        }
    }
    Ok(())
}
