//! Per-series aggregation of a directory tree

use super::walker::{DicomWalker, ScanEntry, SkipCounts};
use crate::domain::{DicomRecordRef, ObscuraError, Result, SeriesKey, SeriesRecord};
use std::collections::HashMap;
use std::path::Path;

/// Series records of a tree, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct SeriesIndex {
    records: Vec<SeriesRecord>,
    positions: HashMap<SeriesKey, usize>,
    skipped: SkipCounts,
}

impl SeriesIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one file: the first file of a key creates its record, later ones
    /// only increment the image count
    pub fn insert(&mut self, record: &DicomRecordRef) {
        match self.positions.get(&record.key) {
            Some(&position) => self.records[position].image_count += 1,
            None => {
                self.positions
                    .insert(record.key.clone(), self.records.len());
                self.records.push(SeriesRecord::from_first(record));
            }
        }
    }

    /// Records in insertion order
    pub fn records(&self) -> &[SeriesRecord] {
        &self.records
    }

    /// Consumes the index, returning records in insertion order
    pub fn into_records(self) -> Vec<SeriesRecord> {
        self.records
    }

    /// Records ordered by series description, ties kept in insertion order
    pub fn grouped_by_description(&self) -> Vec<&SeriesRecord> {
        let mut sorted: Vec<&SeriesRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| a.series_description.cmp(&b.series_description));
        sorted
    }

    /// Files excluded from the index
    pub fn skipped(&self) -> SkipCounts {
        self.skipped
    }

    /// Total images across all series
    pub fn total_images(&self) -> usize {
        self.records.iter().map(|r| r.image_count).sum()
    }

    /// Number of series
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no series were found
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Walks `root` and groups every readable DICOM file into series records
///
/// Non-DICOM and unreadable files are counted in [`SeriesIndex::skipped`] and
/// otherwise ignored.
///
/// # Errors
///
/// Returns a validation error if `root` is not a directory.
pub fn index(root: impl AsRef<Path>) -> Result<SeriesIndex> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(ObscuraError::Validation(format!(
            "Input directory does not exist: {}",
            root.display()
        )));
    }

    let mut series = SeriesIndex::new();
    for entry in DicomWalker::new(root) {
        match entry {
            ScanEntry::Record(record) => series.insert(&record),
            other => series.skipped.record(&other),
        }
    }

    tracing::debug!(
        root = %root.display(),
        series = series.len(),
        images = series.total_images(),
        skipped = series.skipped.total(),
        "Indexed series"
    );

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(patient: &str, study: &str, series: &str, description: &str) -> DicomRecordRef {
        DicomRecordRef {
            path: PathBuf::from(format!("{patient}/{series}.dcm")),
            key: SeriesKey::new(patient, study, series),
            instance_number: None,
            modality: "CT".to_string(),
            series_description: description.to_string(),
            study_description: String::new(),
        }
    }

    #[test]
    fn test_insert_counts_per_key() {
        let mut idx = SeriesIndex::new();
        idx.insert(&record("P1", "S1", "SE1", "axial"));
        idx.insert(&record("P1", "S1", "SE1", "axial"));
        idx.insert(&record("P1", "S1", "SE2", "coronal"));

        assert_eq!(idx.len(), 2);
        assert_eq!(idx.records()[0].image_count, 2);
        assert_eq!(idx.records()[1].image_count, 1);
        assert_eq!(idx.total_images(), 3);
    }

    #[test]
    fn test_first_file_wins_descriptions() {
        let mut idx = SeriesIndex::new();
        idx.insert(&record("P1", "S1", "SE1", "first"));
        idx.insert(&record("P1", "S1", "SE1", "second"));

        assert_eq!(idx.records()[0].series_description, "first");
    }

    #[test]
    fn test_grouped_by_description_is_stable() {
        let mut idx = SeriesIndex::new();
        idx.insert(&record("P2", "S1", "A", "t2"));
        idx.insert(&record("P1", "S1", "B", "t1"));
        idx.insert(&record("P1", "S1", "C", "t2"));

        let grouped: Vec<&str> = idx
            .grouped_by_description()
            .iter()
            .map(|r| r.series_uid.as_str())
            .collect();
        assert_eq!(grouped, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_index_missing_root() {
        let result = index("/nonexistent/obscura/input");
        assert!(matches!(result, Err(ObscuraError::Validation(_))));
    }
}
