//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use obscura::adapters::process::{Invocation, ProcessOutput, ProcessRunner};
use obscura::domain::{ObscuraError, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

/// Attributes of a synthetic DICOM file
#[derive(Debug, Clone)]
pub struct Fixture {
    pub patient_id: String,
    pub study_uid: String,
    pub series_uid: String,
    pub modality: String,
    pub series_description: String,
    pub study_description: String,
    pub instance_number: Option<i32>,
}

impl Fixture {
    pub fn new(patient_id: &str, study_uid: &str, series_uid: &str) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            study_uid: study_uid.to_string(),
            series_uid: series_uid.to_string(),
            modality: "MR".to_string(),
            series_description: "T1 AXIAL".to_string(),
            study_description: "BRAIN".to_string(),
            instance_number: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.series_description = description.to_string();
        self
    }

    pub fn modality(mut self, modality: &str) -> Self {
        self.modality = modality.to_string();
        self
    }

    pub fn instance(mut self, number: i32) -> Self {
        self.instance_number = Some(number);
        self
    }

    /// Writes the fixture as a Part 10 file with the given SOP instance UID
    pub fn write(&self, path: impl AsRef<Path>, sop_instance_uid: &str) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }

        let mut elements = vec![
            DataElement::new(
                tags::SOP_CLASS_UID,
                VR::UI,
                PrimitiveValue::from(uids::MR_IMAGE_STORAGE),
            ),
            DataElement::new(
                tags::SOP_INSTANCE_UID,
                VR::UI,
                PrimitiveValue::from(sop_instance_uid),
            ),
            DataElement::new(
                tags::STUDY_DESCRIPTION,
                VR::LO,
                PrimitiveValue::from(self.study_description.as_str()),
            ),
            DataElement::new(
                tags::MODALITY,
                VR::CS,
                PrimitiveValue::from(self.modality.as_str()),
            ),
            DataElement::new(
                tags::SERIES_DESCRIPTION,
                VR::LO,
                PrimitiveValue::from(self.series_description.as_str()),
            ),
            DataElement::new(
                tags::PATIENT_ID,
                VR::LO,
                PrimitiveValue::from(self.patient_id.as_str()),
            ),
            DataElement::new(
                tags::STUDY_INSTANCE_UID,
                VR::UI,
                PrimitiveValue::from(self.study_uid.as_str()),
            ),
            DataElement::new(
                tags::SERIES_INSTANCE_UID,
                VR::UI,
                PrimitiveValue::from(self.series_uid.as_str()),
            ),
        ];
        if let Some(number) = self.instance_number {
            elements.push(DataElement::new(
                tags::INSTANCE_NUMBER,
                VR::IS,
                PrimitiveValue::from(number.to_string()),
            ));
        }

        InMemDicomObject::from_element_iter(elements)
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(uids::MR_IMAGE_STORAGE)
                    .media_storage_sop_instance_uid(sop_instance_uid),
            )
            .unwrap()
            .write_to_file(path)
            .unwrap();
    }
}

/// Writes `count` instances of one series named `prefix-N.dcm`
pub fn write_series(dir: &Path, fixture: &Fixture, prefix: &str, count: usize) -> Vec<PathBuf> {
    (1..=count)
        .map(|n| {
            let path = dir.join(format!("{prefix}-{n}.dcm"));
            fixture.write(&path, &format!("{}.{n}", fixture.series_uid));
            path
        })
        .collect()
}

/// Regular files under `root`, relative and sorted
pub fn relative_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(root)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    files.sort();
    files
}

/// Behavior of [`FakeRunner`]
#[derive(Debug, Clone, Default)]
pub enum FakeBehavior {
    /// Copy `-in`/`--input` to `-out`/`--output-dir` and report success
    #[default]
    CopyThrough,
    /// Copy, then report the given stderr and exit code
    CopyWithExit { stderr: String, exit_code: i32 },
    /// Fail to start, as if the program were missing
    SpawnError,
}

/// Stand-in for the external engines
///
/// The anonymizer form (`-in DIR -out DIR`) copies the whole tree; the
/// redaction form (`--input FILE --output-dir DIR`) copies one file.
#[derive(Default)]
pub struct FakeRunner {
    pub behavior: FakeBehavior,
    pub calls: Mutex<Vec<(String, Invocation)>>,
}

impl FakeRunner {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Invocation)> {
        self.calls.lock().unwrap().clone()
    }

    fn copy_through(invocation: &Invocation) -> Result<usize> {
        if let (Some(input), Some(output)) = (invocation.arg_after("-in"), invocation.arg_after("-out")) {
            let (input, output) = (Path::new(input), Path::new(output));
            let mut copied = 0;
            for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry.path().strip_prefix(input).unwrap_or(entry.path());
                let destination = output.join(relative);
                if let Some(parent) = destination.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(entry.path(), destination)?;
                copied += 1;
            }
            return Ok(copied);
        }

        if let (Some(file), Some(output)) = (
            invocation.arg_after("--input"),
            invocation.arg_after("--output-dir"),
        ) {
            let file = Path::new(file);
            let name = file.file_name().unwrap_or_default();
            std::fs::create_dir_all(output)?;
            std::fs::copy(file, Path::new(output).join(name))?;
            return Ok(1);
        }

        Ok(0)
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, stage: &str, invocation: &Invocation) -> Result<ProcessOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((stage.to_string(), invocation.clone()));

        if let FakeBehavior::SpawnError = self.behavior {
            return Err(ObscuraError::external_stage(
                stage,
                format!("failed to start '{}': not found", invocation.program),
            ));
        }

        let copied = Self::copy_through(invocation)?;
        let mut stdout = String::new();
        for _ in 0..copied {
            stdout.push_str("Anonymized file\n");
        }
        stdout.push_str("Elapsed time: 0.5 seconds\n");

        Ok(match &self.behavior {
            FakeBehavior::CopyWithExit { stderr, exit_code } => ProcessOutput {
                stdout,
                stderr: stderr.clone(),
                exit_code: Some(*exit_code),
            },
            _ => ProcessOutput {
                stdout,
                stderr: String::new(),
                exit_code: Some(0),
            },
        })
    }
}
