//! External system integrations for Obscura.
//!
//! - [`process`] - Launching external programs behind the [`process::ProcessRunner`] trait
//! - [`redaction`] - OCR redaction of burned-in pixel text
//! - [`anonymizer`] - Batch DICOM metadata anonymizer
//! - [`clinical`] - Pseudonymization of clinical CSV files
//!
//! External engines are reached only through [`process::ProcessRunner`], so
//! tests substitute a recording runner for real binaries.

pub mod anonymizer;
pub mod clinical;
pub mod process;
pub mod redaction;
