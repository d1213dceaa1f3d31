//! Imaging record and series aggregate types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Grouping key of a series: (patient id, study instance UID, series instance UID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub patient_id: String,
    pub study_uid: String,
    pub series_uid: String,
}

impl SeriesKey {
    /// Creates a new series key
    pub fn new(
        patient_id: impl Into<String>,
        study_uid: impl Into<String>,
        series_uid: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            study_uid: study_uid.into(),
            series_uid: series_uid.into(),
        }
    }
}

/// One imaging file plus the header fields needed to group and describe it
///
/// Built from the header only; pixel data is never read.
#[derive(Debug, Clone, PartialEq)]
pub struct DicomRecordRef {
    /// Location of the file
    pub path: PathBuf,

    /// Patient / study / series identifiers
    pub key: SeriesKey,

    /// Instance Number (0020,0013), if present and numeric
    pub instance_number: Option<i32>,

    /// Modality (0008,0060), empty if absent
    pub modality: String,

    /// Series Description (0008,103E), empty if absent
    pub series_description: String,

    /// Study Description (0008,1030), empty if absent
    pub study_description: String,
}

/// Aggregate over every file sharing one [`SeriesKey`]
///
/// Descriptive fields come from the first file seen for the key; later files
/// only bump `image_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub patient_id: String,
    pub study_uid: String,
    pub series_uid: String,
    pub modality: String,
    pub series_description: String,
    pub study_description: String,
    pub image_count: usize,
}

impl SeriesRecord {
    /// Starts a new aggregate from the first file of a series
    pub fn from_first(record: &DicomRecordRef) -> Self {
        Self {
            patient_id: record.key.patient_id.clone(),
            study_uid: record.key.study_uid.clone(),
            series_uid: record.key.series_uid.clone(),
            modality: record.modality.clone(),
            series_description: record.series_description.clone(),
            study_description: record.study_description.clone(),
            image_count: 1,
        }
    }
}
