//! Integration tests for series indexing and the description report

mod common;

use common::{write_series, Fixture};
use obscura::core::index::{aggregate_by_description, index, is_supported, read_header};
use obscura::domain::HeaderError;
use tempfile::TempDir;

#[test]
fn test_counts_per_series() {
    let dir = TempDir::new().unwrap();
    let axial = Fixture::new("P1", "1.2.3", "1.2.3.1").description("T1 AXIAL");
    let sagittal = Fixture::new("P1", "1.2.3", "1.2.3.2").description("T2 SAG");
    write_series(dir.path(), &axial, "a", 3);
    write_series(&dir.path().join("nested"), &sagittal, "s", 1);

    let series = index(dir.path()).unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series.total_images(), 4);
    let axial_record = series
        .records()
        .iter()
        .find(|r| r.series_uid == "1.2.3.1")
        .unwrap();
    assert_eq!(axial_record.image_count, 3);
    assert_eq!(axial_record.series_description, "T1 AXIAL");
    assert_eq!(axial_record.modality, "MR");
    let sagittal_record = series
        .records()
        .iter()
        .find(|r| r.series_uid == "1.2.3.2")
        .unwrap();
    assert_eq!(sagittal_record.image_count, 1);
}

#[test]
fn test_report_totals_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_series(
        dir.path(),
        &Fixture::new("P1", "1.2.3", "1.2.3.1").description("T1"),
        "a",
        2,
    );
    write_series(
        dir.path(),
        &Fixture::new("P1", "1.2.3", "1.2.3.2").description("T2"),
        "b",
        1,
    );

    let series = index(dir.path()).unwrap();
    let report = aggregate_by_description(series.records());

    assert_eq!(report.total_series, 2);
    assert_eq!(report.total_patients, 1);
    assert_eq!(report.total_studies, 1);
    assert_eq!(report.total_images, 3);
    let descriptions: Vec<&str> = report
        .groups
        .iter()
        .map(|g| g.series_description.as_str())
        .collect();
    assert_eq!(descriptions, vec!["T1", "T2"]);
}

#[test]
fn test_same_description_across_patients_is_one_group() {
    let dir = TempDir::new().unwrap();
    write_series(dir.path(), &Fixture::new("P1", "1.1", "1.1.1").modality("CT"), "p1", 2);
    write_series(dir.path(), &Fixture::new("P2", "2.1", "2.1.1"), "p2", 1);

    let report = aggregate_by_description(index(dir.path()).unwrap().records());

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert_eq!(group.patient_count, 2);
    assert_eq!(group.study_count, 2);
    assert_eq!(group.series_count, 2);
    assert_eq!(group.image_count, 3);
    assert_eq!(
        group.modalities.iter().cloned().collect::<Vec<_>>(),
        vec!["CT".to_string(), "MR".to_string()]
    );
}

#[test]
fn test_non_dicom_files_excluded() {
    let dir = TempDir::new().unwrap();
    write_series(dir.path(), &Fixture::new("P1", "1.2.3", "1.2.3.1"), "a", 2);
    std::fs::write(dir.path().join("DICOMDIR.txt"), "index").unwrap();
    std::fs::write(dir.path().join("clinical.csv"), "patient_id\nP1\n").unwrap();
    std::fs::write(dir.path().join("empty.dcm"), b"").unwrap();

    let series = index(dir.path()).unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series.total_images(), 2);
    assert_eq!(series.skipped().unsupported, 3);
    assert_eq!(series.skipped().unreadable, 0);
}

#[test]
fn test_magic_check_and_header_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("one.dcm");
    Fixture::new("P9", "9.8", "9.8.7").instance(12).write(&path, "9.8.7.1");
    let fake = dir.path().join("fake.dcm");
    std::fs::write(&fake, vec![0u8; 200]).unwrap();

    assert!(is_supported(&path));
    assert!(!is_supported(&fake));
    assert!(!is_supported(&dir.path().join("missing.dcm")));

    let record = read_header(&path).unwrap();
    assert_eq!(record.key.patient_id, "P9");
    assert_eq!(record.key.study_uid, "9.8");
    assert_eq!(record.key.series_uid, "9.8.7");
    assert_eq!(record.instance_number, Some(12));

    assert!(matches!(read_header(&fake), Err(HeaderError::NotDicom(_))));
}

#[test]
fn test_missing_root_is_error() {
    assert!(index("/nonexistent/obscura/input").is_err());
}

#[test]
fn test_empty_patient_id_is_indexed() {
    let dir = TempDir::new().unwrap();
    write_series(dir.path(), &Fixture::new("", "1.2", "1.2.3"), "img", 3);

    let series = index(dir.path()).unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series.total_images(), 3);
    assert_eq!(series.skipped().total(), 0);
    assert_eq!(series.records()[0].patient_id, "");
}

#[cfg(unix)]
#[test]
fn test_symlinked_files_are_indexed() {
    let dir = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let sources = write_series(elsewhere.path(), &Fixture::new("P1", "1.2", "1.2.3"), "img", 2);
    for (i, source) in sources.iter().enumerate() {
        std::os::unix::fs::symlink(source, dir.path().join(format!("link-{i}.dcm"))).unwrap();
    }

    let series = index(dir.path()).unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series.total_images(), 2);
}
