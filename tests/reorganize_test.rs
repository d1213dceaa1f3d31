//! Integration tests for the Patient/Study/Series reorganization

mod common;

use common::{relative_files, write_series, Fixture};
use obscura::core::index::read_header;
use obscura::core::reorganize::{reorganize, ReorganizeOrder};
use tempfile::TempDir;

#[test]
fn test_single_series_numbered_from_one() {
    let flat = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    write_series(flat.path(), &Fixture::new("P1", "1.2", "1.2.3"), "img", 4);

    let summary = reorganize(flat.path(), target.path(), ReorganizeOrder::Traversal).unwrap();

    assert_eq!(summary.files_copied, 4);
    assert_eq!(summary.series_directories, 1);
    assert_eq!(
        relative_files(target.path()),
        vec![
            "P1/1.2/1.2.3/00001.dcm",
            "P1/1.2/1.2.3/00002.dcm",
            "P1/1.2/1.2.3/00003.dcm",
            "P1/1.2/1.2.3/00004.dcm",
        ]
    );
}

#[test]
fn test_one_directory_per_series() {
    let flat = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    write_series(flat.path(), &Fixture::new("P1", "1.1", "1.1.1"), "a", 2);
    write_series(flat.path(), &Fixture::new("P1", "1.1", "1.1.2"), "b", 1);
    write_series(
        &flat.path().join("deeper"),
        &Fixture::new("P2", "2.1", "2.1.1"),
        "c",
        3,
    );

    let summary = reorganize(flat.path(), target.path(), ReorganizeOrder::Traversal).unwrap();

    assert_eq!(summary.series_directories, 3);
    assert_eq!(summary.files_copied, 6);
    let files = relative_files(target.path());
    assert!(files.contains(&"P1/1.1/1.1.1/00002.dcm".to_string()));
    assert!(files.contains(&"P1/1.1/1.1.2/00001.dcm".to_string()));
    assert!(files.contains(&"P2/2.1/2.1.1/00003.dcm".to_string()));
    assert_eq!(files.len(), 6);
}

#[test]
fn test_copies_are_byte_identical_and_source_untouched() {
    let flat = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let sources = write_series(flat.path(), &Fixture::new("P1", "1.2", "1.2.3"), "img", 1);

    reorganize(flat.path(), target.path(), ReorganizeOrder::Traversal).unwrap();

    let copied = std::fs::read(target.path().join("P1/1.2/1.2.3/00001.dcm")).unwrap();
    assert_eq!(copied, std::fs::read(&sources[0]).unwrap());
    assert!(sources[0].exists());
}

#[test]
fn test_instance_number_order() {
    let flat = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let base = Fixture::new("P1", "1.2", "1.2.3");
    // traversal order a, b, c, d; instance numbers 3, none, 1, 2
    base.clone().instance(3).write(flat.path().join("a.dcm"), "1.2.3.30");
    base.clone().write(flat.path().join("b.dcm"), "1.2.3.99");
    base.clone().instance(1).write(flat.path().join("c.dcm"), "1.2.3.10");
    base.clone().instance(2).write(flat.path().join("d.dcm"), "1.2.3.20");

    reorganize(flat.path(), target.path(), ReorganizeOrder::InstanceNumber).unwrap();

    let series_dir = target.path().join("P1/1.2/1.2.3");
    let numbers: Vec<Option<i32>> = (1..=4)
        .map(|n| {
            read_header(&series_dir.join(format!("{n:05}.dcm")))
                .unwrap()
                .instance_number
        })
        .collect();
    assert_eq!(numbers, vec![Some(1), Some(2), Some(3), None]);
}

#[test]
fn test_traversal_order_follows_file_names() {
    let flat = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let base = Fixture::new("P1", "1.2", "1.2.3");
    base.clone().instance(2).write(flat.path().join("a.dcm"), "1.2.3.2");
    base.clone().instance(1).write(flat.path().join("b.dcm"), "1.2.3.1");

    reorganize(flat.path(), target.path(), ReorganizeOrder::Traversal).unwrap();

    let first = read_header(&target.path().join("P1/1.2/1.2.3/00001.dcm")).unwrap();
    assert_eq!(first.instance_number, Some(2));
}

#[test]
fn test_non_dicom_files_not_copied() {
    let flat = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    write_series(flat.path(), &Fixture::new("P1", "1.2", "1.2.3"), "img", 2);
    std::fs::write(flat.path().join("anonymizer.log"), "done").unwrap();
    std::fs::write(flat.path().join("README"), "notes").unwrap();

    let summary = reorganize(flat.path(), target.path(), ReorganizeOrder::Traversal).unwrap();

    assert_eq!(summary.files_copied, 2);
    assert_eq!(summary.skipped.unsupported, 2);
    assert_eq!(relative_files(target.path()).len(), 2);
}

#[test]
fn test_unsafe_identifiers_stay_inside_target() {
    let flat = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    write_series(flat.path(), &Fixture::new("../escape", "..", "a/b"), "img", 1);

    reorganize(flat.path(), target.path(), ReorganizeOrder::Traversal).unwrap();

    let files = relative_files(target.path());
    assert_eq!(files.len(), 1);
    assert!(
        files[0].split('/').all(|c| c != ".." && c != "."),
        "{}",
        files[0]
    );
    assert_eq!(files[0].split('/').count(), 4);
    assert!(!target.path().parent().unwrap().join("escape").exists());
}

#[test]
fn test_missing_flat_dir_is_error() {
    let target = TempDir::new().unwrap();
    let result = reorganize(
        target.path().join("missing"),
        target.path(),
        ReorganizeOrder::Traversal,
    );
    assert!(result.is_err());
}

#[test]
fn test_empty_patient_id_is_copied_under_unknown() {
    let flat = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    write_series(flat.path(), &Fixture::new("", "1.2", "1.2.3"), "img", 3);

    let summary = reorganize(flat.path(), target.path(), ReorganizeOrder::Traversal).unwrap();

    assert_eq!(summary.files_copied, 3);
    assert_eq!(summary.skipped.total(), 0);
    assert_eq!(
        relative_files(target.path()),
        vec![
            "UNKNOWN/1.2/1.2.3/00001.dcm",
            "UNKNOWN/1.2/1.2.3/00002.dcm",
            "UNKNOWN/1.2/1.2.3/00003.dcm",
        ]
    );
}
