//! Secret command implementation

use crate::domain::SecretKey;
use clap::Args;

/// Arguments for the secret command
#[derive(Args, Debug)]
pub struct SecretArgs {}

impl SecretArgs {
    /// Print a freshly generated secret key
    ///
    /// Store it somewhere safe: rerunning the pipeline with the same key
    /// keeps pseudonyms stable across deliveries.
    pub async fn execute(&self) -> anyhow::Result<i32> {
        println!("{}", SecretKey::generate().expose());
        Ok(0)
    }
}
