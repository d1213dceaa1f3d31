//! Domain identifier types with validation
//!
//! Newtype wrappers keep the caller-supplied site identifier and the derived
//! provider identifier from being mixed up with each other or with plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of the data-contributing site
///
/// Opaque, caller-supplied, never written into output files directly. It is
/// mapped one-way to a [`ProviderId`].
///
/// # Examples
///
/// ```
/// use obscura::domain::ids::SiteId;
/// use std::str::FromStr;
///
/// let site = SiteId::from_str("SITE-042").unwrap();
/// assert_eq!(site.as_str(), "SITE-042");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteId(String);

impl SiteId {
    /// Creates a new SiteId, rejecting empty or whitespace-only input
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Site ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the site ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SiteId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SiteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Provider identifier written by the metadata anonymizer
///
/// Always a 64-character lowercase hex SHA-256 digest, which also fits the
/// 64-character limit of a DICOM LO element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    /// Wraps an already computed digest
    pub(crate) fn from_digest(digest: String) -> Self {
        Self(digest)
    }

    /// Returns the provider ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProviderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
