//! Secret value handling using the secrecy crate
//!
//! The run's pseudonymization key is the only credential Obscura handles. It
//! is kept inside a `Secret` so it is zeroized when dropped and redacted from
//! `Debug` output; reading it requires an explicit `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use obscura::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("0190a3c4e5f67b8c9d0e1f2a3b4c5d6e7".to_string());
//! assert_eq!(key.expose_secret().as_ref(), "0190a3c4e5f67b8c9d0e1f2a3b4c5d6e7");
//! assert!(!format!("{key:?}").contains("0190a3c4"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype that satisfies the trait bounds of `Secret`
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A zeroize-on-drop string that never shows up in `Debug` output
pub type SecretString = Secret<SecretValue>;

/// Wraps a String into a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}
