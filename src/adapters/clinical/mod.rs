//! Clinical CSV hashing
//!
//! Runs last in the pipeline with the same [`SecretKey`] the metadata
//! anonymizer received, so pseudonyms in the tabular data can be linked to
//! the imaging output by whoever holds the key.

pub mod csv;

use crate::config::ClinicalConfig;
use crate::core::pipeline::outcome::StageOutcome;
use crate::domain::{ObscuraError, Result, SecretKey};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Counters of one hashing pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClinicalSummary {
    /// CSV files written to the output directory
    pub files_hashed: usize,

    /// CSV files left alone because of the ignore prefix
    pub files_ignored: usize,

    /// CSV files not written because no identifier column was found
    pub files_withheld: usize,

    /// Non-empty identifier cells replaced by pseudonyms
    pub cells_hashed: usize,
}

/// Boundary of the tabular de-identification stage
pub trait ClinicalHasher: Send + Sync {
    /// De-identifies the tabular files in `input_dir` into `output_dir`
    fn hash(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        secret_key: &SecretKey,
    ) -> StageOutcome<ClinicalSummary>;
}

/// Hashes identifier columns of top-level CSV files
pub struct CsvClinicalHasher {
    config: ClinicalConfig,
}

impl CsvClinicalHasher {
    /// Create a new hasher
    pub fn new(config: ClinicalConfig) -> Self {
        Self { config }
    }

    /// Pseudonym of one identifier value
    ///
    /// `prefix + hex(SHA-256(value ":" key))`; surrounding whitespace of the
    /// value is ignored.
    pub fn pseudonym(&self, value: &str, secret_key: &SecretKey) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.trim().as_bytes());
        hasher.update(b":");
        hasher.update(secret_key.expose().as_bytes());
        format!("{}{:x}", self.config.pseudonym_prefix, hasher.finalize())
    }

    fn try_hash(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        secret_key: &SecretKey,
    ) -> Result<StageOutcome<ClinicalSummary>> {
        let mut summary = ClinicalSummary::default();
        let mut messages = Vec::new();

        let files = self.csv_files(input_dir)?;
        if files.is_empty() {
            tracing::warn!(input_dir = %input_dir.display(), "No clinical CSV files found");
            messages.push(format!(
                "No clinical CSV files found in {}",
                input_dir.display()
            ));
            return Ok(StageOutcome::Warning { summary, messages });
        }

        std::fs::create_dir_all(output_dir).map_err(|e| {
            ObscuraError::Io(format!(
                "Failed to create clinical output {}: {e}",
                output_dir.display()
            ))
        })?;

        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !self.config.ignore_prefix.is_empty() && name.starts_with(&self.config.ignore_prefix)
            {
                tracing::debug!(file = %name, "Ignoring clinical CSV");
                summary.files_ignored += 1;
                continue;
            }

            let contents = std::fs::read_to_string(&file).map_err(|e| {
                ObscuraError::Io(format!("Failed to read {}: {e}", file.display()))
            })?;
            let Some((rendered, cells)) = self.hash_contents(&contents, secret_key) else {
                tracing::warn!(file = %name, "No identifier columns in clinical CSV, file withheld");
                messages.push(format!(
                    "{name}: no identifier columns found, file not written to output"
                ));
                summary.files_withheld += 1;
                continue;
            };

            let target = output_dir.join(&name);
            std::fs::write(&target, rendered).map_err(|e| {
                ObscuraError::Io(format!("Failed to write {}: {e}", target.display()))
            })?;

            tracing::debug!(file = %name, cells, "Hashed clinical CSV");
            summary.files_hashed += 1;
            summary.cells_hashed += cells;
        }

        tracing::info!(
            files = summary.files_hashed,
            ignored = summary.files_ignored,
            withheld = summary.files_withheld,
            cells = summary.cells_hashed,
            "Clinical hashing completed"
        );

        Ok(StageOutcome::from_messages(summary, messages))
    }

    /// Rewritten CSV and number of hashed cells, or `None` if the header has
    /// no identifier column
    ///
    /// A leading byte order mark is kept in the rewritten file.
    fn hash_contents(&self, contents: &str, secret_key: &SecretKey) -> Option<(String, usize)> {
        let mut records = csv::parse_records(contents).into_iter();
        let header = records.next()?;

        let columns: Vec<usize> = header
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                self.config
                    .id_columns
                    .iter()
                    .any(|c| c.trim().eq_ignore_ascii_case(name.trim()))
            })
            .map(|(i, _)| i)
            .collect();
        if columns.is_empty() {
            return None;
        }

        let mut cells = 0;
        let mut rendered = String::new();
        if contents.starts_with(csv::BOM) {
            rendered.push(csv::BOM);
        }
        rendered.push_str(&csv::write_record(&header));
        for mut record in records {
            for &column in &columns {
                if let Some(cell) = record.get_mut(column) {
                    if !cell.trim().is_empty() {
                        *cell = self.pseudonym(cell, secret_key);
                        cells += 1;
                    }
                }
            }
            rendered.push_str(&csv::write_record(&record));
        }

        Some((rendered, cells))
    }

    fn csv_files(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        if !input_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(input_dir)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl ClinicalHasher for CsvClinicalHasher {
    fn hash(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        secret_key: &SecretKey,
    ) -> StageOutcome<ClinicalSummary> {
        match self.try_hash(input_dir, output_dir, secret_key) {
            Ok(outcome) => outcome,
            Err(cause) => StageOutcome::Failure { cause },
        }
    }
}
