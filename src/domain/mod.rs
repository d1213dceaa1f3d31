//! Domain models and types for Obscura.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`SiteId`], [`ProviderId`])
//! - **Run key material** ([`SecretKey`], [`derive_provider_id`])
//! - **Imaging records** ([`DicomRecordRef`], [`SeriesRecord`])
//! - **Error types** ([`ObscuraError`], [`HeaderError`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use obscura::domain::{derive_provider_id, secret_key, SecretKey, SiteId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let key = SecretKey::generate();
//! assert!(secret_key::validate(key.expose()));
//!
//! let provider = derive_provider_id(&SiteId::new("SITE-042")?);
//! assert_eq!(provider.as_str().len(), 64);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod secret_key;
pub mod series;

// Re-export commonly used types for convenience
pub use errors::{HeaderError, ObscuraError};
pub use ids::{ProviderId, SiteId};
pub use result::Result;
pub use secret_key::{derive_provider_id, SecretKey};
pub use series::{DicomRecordRef, SeriesKey, SeriesRecord};
