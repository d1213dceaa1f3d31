//! CLI command implementations
//!
//! Every command returns its process exit code: 0 on success, 2 for
//! configuration errors, 5 for fatal run failures.

pub mod init;
pub mod run;
pub mod secret;
pub mod series_info;
pub mod validate;
