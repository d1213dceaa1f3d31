//! Series report grouped by series description

use crate::domain::SeriesRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Statistics of all series sharing one series description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptionGroup {
    pub series_description: String,
    pub modalities: BTreeSet<String>,
    pub patient_count: usize,
    pub study_count: usize,
    pub series_count: usize,
    pub image_count: usize,
}

/// Description-grouped report plus grand totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesReport {
    /// Groups ordered by series description
    pub groups: Vec<DescriptionGroup>,
    pub total_patients: usize,
    pub total_studies: usize,
    pub total_series: usize,
    pub total_images: usize,
}

#[derive(Default)]
struct GroupAccumulator<'a> {
    modalities: BTreeSet<String>,
    patients: HashSet<&'a str>,
    studies: HashSet<(&'a str, &'a str)>,
    series_count: usize,
    image_count: usize,
}

/// Groups series records by description and computes totals
///
/// Studies are counted as distinct (patient, study) pairs.
pub fn aggregate_by_description(records: &[SeriesRecord]) -> SeriesReport {
    let mut groups: BTreeMap<&str, GroupAccumulator<'_>> = BTreeMap::new();
    let mut patients = HashSet::new();
    let mut studies = HashSet::new();
    let mut series = HashSet::new();
    let mut total_images = 0;

    for record in records {
        let patient = record.patient_id.as_str();
        let study = (patient, record.study_uid.as_str());

        let group = groups
            .entry(record.series_description.as_str())
            .or_default();
        group.modalities.insert(record.modality.clone());
        group.patients.insert(patient);
        group.studies.insert(study);
        group.series_count += 1;
        group.image_count += record.image_count;

        patients.insert(patient);
        studies.insert(study);
        series.insert((patient, record.study_uid.as_str(), record.series_uid.as_str()));
        total_images += record.image_count;
    }

    SeriesReport {
        groups: groups
            .into_iter()
            .map(|(description, acc)| DescriptionGroup {
                series_description: description.to_string(),
                modalities: acc.modalities,
                patient_count: acc.patients.len(),
                study_count: acc.studies.len(),
                series_count: acc.series_count,
                image_count: acc.image_count,
            })
            .collect(),
        total_patients: patients.len(),
        total_studies: studies.len(),
        total_series: series.len(),
        total_images,
    }
}
