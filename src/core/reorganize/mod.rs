//! Canonical Patient/Study/Series layout for anonymized output
//!
//! [`reorganize`] re-reads the headers of a flat directory of anonymized
//! files and copies each file to
//! `target_dir/<patient>/<study>/<series>/<NNNNN>.dcm`, numbering files per
//! series directory starting at `00001`.

use crate::core::index::{DicomWalker, ScanEntry, SkipCounts};
use crate::domain::{DicomRecordRef, ObscuraError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Placeholder for identifiers that cannot be used as a path component
pub const UNKNOWN_COMPONENT: &str = "UNKNOWN";

/// Order in which files of one series receive their sequence numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReorganizeOrder {
    /// Directory traversal order (file-name order within each directory)
    #[default]
    Traversal,

    /// Ascending Instance Number; files without one go last, ties keep
    /// traversal order
    InstanceNumber,
}

impl fmt::Display for ReorganizeOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReorganizeOrder::Traversal => write!(f, "traversal"),
            ReorganizeOrder::InstanceNumber => write!(f, "instance-number"),
        }
    }
}

impl FromStr for ReorganizeOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "traversal" => Ok(ReorganizeOrder::Traversal),
            "instance-number" | "instance_number" => Ok(ReorganizeOrder::InstanceNumber),
            other => Err(format!(
                "reorganize_order must be 'traversal' or 'instance-number', got '{other}'"
            )),
        }
    }
}

/// Result of one [`reorganize`] call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReorganizeSummary {
    /// Files copied into the hierarchy
    pub files_copied: usize,

    /// Series directories created or reused
    pub series_directories: usize,

    /// Files left out of the hierarchy
    pub skipped: SkipCounts,
}

/// Files bound for one series directory, in first-encounter order
struct SeriesBucket {
    dir: PathBuf,
    files: Vec<DicomRecordRef>,
}

/// Rewrites `flat_dir` into a Patient/Study/Series hierarchy under `target_dir`
///
/// Every series directory gets its own counter starting at 1, so no two
/// source files ever share a destination path within one call. Files that
/// are not DICOM or whose headers cannot be read are counted and skipped.
///
/// # Errors
///
/// Returns a validation error if `flat_dir` is not a directory, and an I/O
/// error if a directory cannot be created or a file cannot be copied.
pub fn reorganize(
    flat_dir: impl AsRef<Path>,
    target_dir: impl AsRef<Path>,
    order: ReorganizeOrder,
) -> Result<ReorganizeSummary> {
    let flat_dir = flat_dir.as_ref();
    let target_dir = target_dir.as_ref();

    if !flat_dir.is_dir() {
        return Err(ObscuraError::Validation(format!(
            "Directory to reorganize does not exist: {}",
            flat_dir.display()
        )));
    }

    let mut summary = ReorganizeSummary::default();
    let mut buckets: Vec<SeriesBucket> = Vec::new();
    let mut positions: HashMap<PathBuf, usize> = HashMap::new();

    for entry in DicomWalker::new(flat_dir) {
        let record = match entry {
            ScanEntry::Record(record) => record,
            other => {
                summary.skipped.record(&other);
                continue;
            }
        };

        let dir = series_dir(target_dir, &record);
        match positions.get(&dir) {
            Some(&position) => buckets[position].files.push(record),
            None => {
                positions.insert(dir.clone(), buckets.len());
                buckets.push(SeriesBucket {
                    dir,
                    files: vec![record],
                });
            }
        }
    }

    for bucket in &mut buckets {
        if order == ReorganizeOrder::InstanceNumber {
            // stable: equal or missing numbers keep traversal order
            bucket
                .files
                .sort_by_key(|r| (r.instance_number.is_none(), r.instance_number));
        }

        std::fs::create_dir_all(&bucket.dir).map_err(|e| {
            ObscuraError::Io(format!(
                "Failed to create series directory {}: {e}",
                bucket.dir.display()
            ))
        })?;

        for (counter, record) in (1usize..).zip(&bucket.files) {
            let destination = bucket.dir.join(format!("{counter:05}.dcm"));
            std::fs::copy(&record.path, &destination).map_err(|e| {
                ObscuraError::Io(format!(
                    "Failed to copy {} to {}: {e}",
                    record.path.display(),
                    destination.display()
                ))
            })?;
            summary.files_copied += 1;
        }
    }

    summary.series_directories = buckets.len();

    tracing::debug!(
        source = %flat_dir.display(),
        target = %target_dir.display(),
        order = %order,
        files = summary.files_copied,
        series = summary.series_directories,
        skipped = summary.skipped.total(),
        "Reorganized output"
    );

    Ok(summary)
}

fn series_dir(target_dir: &Path, record: &DicomRecordRef) -> PathBuf {
    target_dir
        .join(sanitize_component(&record.key.patient_id))
        .join(sanitize_component(&record.key.study_uid))
        .join(sanitize_component(&record.key.series_uid))
}

/// Makes an identifier safe to use as a single path component
///
/// Separators and NUL become `_`; empty, `.` and `..` become [`UNKNOWN_COMPONENT`].
pub fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => UNKNOWN_COMPONENT.to_string(),
        _ => cleaned,
    }
}
