//! Run secret key and provider identifier derivation
//!
//! A [`SecretKey`] is 32 lowercase hex digits taken from a UUIDv7 followed by
//! one Luhn mod 16 check digit over the alphabet `0-9a-f`, 33 symbols in
//! total. The time-ordered UUID only helps correlate logs; consumers compare
//! keys for equality and nothing else.

use crate::config::secret::{secret_string, SecretString};
use crate::domain::errors::ObscuraError;
use crate::domain::ids::{ProviderId, SiteId};
use crate::domain::Result;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Alphabet the checksum is computed over
pub const SECRET_KEY_ALPHABET: &[u8; 16] = b"0123456789abcdef";

/// Total key length: 32 hex digits plus one check digit
pub const SECRET_KEY_LEN: usize = 33;

/// Per-run pseudonymization key ("pepper")
///
/// Immutable once created. The same value is handed to the metadata
/// anonymizer and to the clinical hasher so both outputs stay linkable for
/// whoever holds the key.
#[derive(Clone)]
pub struct SecretKey(SecretString);

impl SecretKey {
    /// Generates a fresh key from a UUIDv7 plus its check digit
    pub fn generate() -> Self {
        let body = Uuid::now_v7().simple().to_string();
        let check = check_digit(body.as_bytes());
        let mut key = body;
        key.push(check as char);
        Self(secret_string(key))
    }

    /// Accepts a caller-supplied key
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key fails [`validate`].
    pub fn parse(candidate: &str) -> Result<Self> {
        if !validate(candidate) {
            return Err(ObscuraError::Configuration(
                "Invalid secret key: expected 33 lowercase hex characters with a valid check digit"
                    .to_string(),
            ));
        }
        Ok(Self(secret_string(candidate.to_string())))
    }

    /// Returns the key in clear text
    pub fn expose(&self) -> &str {
        self.0.expose_secret().as_ref()
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// Checks length, alphabet and check digit of a candidate key
///
/// Total over any input: malformed strings yield `false`, never a panic.
pub fn validate(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    if bytes.len() != SECRET_KEY_LEN {
        return false;
    }
    match luhn_checksum(bytes) {
        Some(sum) => sum == 0,
        None => false,
    }
}

/// Maps a site identifier to its provider identifier (SHA-256, lowercase hex)
pub fn derive_provider_id(site_id: &SiteId) -> ProviderId {
    let digest = Sha256::digest(site_id.as_str().as_bytes());
    ProviderId::from_digest(format!("{digest:x}"))
}

fn symbol_value(symbol: u8) -> Option<u32> {
    SECRET_KEY_ALPHABET
        .iter()
        .position(|&s| s == symbol)
        .map(|p| p as u32)
}

/// Luhn mod N sum, `None` if a symbol is outside the alphabet
fn luhn_checksum(symbols: &[u8]) -> Option<u32> {
    let n = SECRET_KEY_ALPHABET.len() as u32;
    let mut sum = 0;
    for (i, &symbol) in symbols.iter().rev().enumerate() {
        let value = symbol_value(symbol)?;
        sum += if i % 2 == 0 {
            value
        } else {
            let doubled = value * 2;
            doubled / n + doubled % n
        };
    }
    Some(sum % n)
}

fn check_digit(body: &[u8]) -> u8 {
    let n = SECRET_KEY_ALPHABET.len() as u32;
    let mut padded = body.to_vec();
    padded.push(SECRET_KEY_ALPHABET[0]);
    // body is always hex here
    let sum = luhn_checksum(&padded).unwrap_or(0);
    SECRET_KEY_ALPHABET[((n - sum) % n) as usize]
}
