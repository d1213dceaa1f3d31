//! Directory traversal and minimal DICOM header reads
//!
//! [`DicomWalker`] lazily visits every regular file under a root exactly
//! once. Each file is first checked with [`is_supported`]; files that pass
//! are parsed up to (but excluding) Pixel Data. Walking again from the same
//! root simply means constructing a new walker.

use crate::domain::{DicomRecordRef, HeaderError, SeriesKey};
use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::{DefaultDicomObject, OpenFileOptions};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Length of the DICOM file preamble
pub const PREAMBLE_LEN: u64 = 128;

/// Magic value following the preamble
pub const DICOM_MAGIC: &[u8; 4] = b"DICM";

/// Returns whether `path` carries the 128-byte preamble and `DICM` magic
///
/// Never fails: unreadable or short files are simply not supported.
pub fn is_supported(path: &Path) -> bool {
    File::open(path)
        .and_then(|mut file| has_magic(&mut file))
        .unwrap_or(false)
}

/// Checks the magic of an open file; a file shorter than the preamble is
/// not DICOM, any other read failure is an error
fn has_magic(file: &mut File) -> std::io::Result<bool> {
    file.seek(SeekFrom::Start(PREAMBLE_LEN))?;
    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(&magic == DICOM_MAGIC),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Reads the grouping and descriptive attributes of one DICOM file
///
/// # Errors
///
/// - [`HeaderError::Io`] if the file cannot be opened or read
/// - [`HeaderError::NotDicom`] if the magic check fails
/// - [`HeaderError::Parse`] if the data set cannot be decoded
/// - [`HeaderError::MissingAttribute`] if a grouping identifier is absent
pub fn read_header(path: &Path) -> Result<DicomRecordRef, HeaderError> {
    let io_error = |e: std::io::Error| HeaderError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    };
    let mut file = File::open(path).map_err(io_error)?;
    if !has_magic(&mut file).map_err(io_error)? {
        return Err(HeaderError::NotDicom(path.display().to_string()));
    }
    drop(file);

    let obj = OpenFileOptions::new()
        .read_until(tags::PIXEL_DATA)
        .open_file(path)
        .map_err(|e| HeaderError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    // PatientID is type 2: it must be present but may be empty
    let key = SeriesKey::new(
        present_text(&obj, path, tags::PATIENT_ID, "PatientID")?,
        required_text(&obj, path, tags::STUDY_INSTANCE_UID, "StudyInstanceUID")?,
        required_text(&obj, path, tags::SERIES_INSTANCE_UID, "SeriesInstanceUID")?,
    );

    let instance_number = obj
        .element_opt(tags::INSTANCE_NUMBER)
        .ok()
        .flatten()
        .and_then(|e| e.to_int::<i32>().ok());

    Ok(DicomRecordRef {
        path: path.to_path_buf(),
        key,
        instance_number,
        modality: text(&obj, tags::MODALITY).unwrap_or_default(),
        series_description: text(&obj, tags::SERIES_DESCRIPTION).unwrap_or_default(),
        study_description: text(&obj, tags::STUDY_DESCRIPTION).unwrap_or_default(),
    })
}

fn text(obj: &DefaultDicomObject, tag: Tag) -> Option<String> {
    obj.element_opt(tag)
        .ok()
        .flatten()
        .and_then(|e| e.to_str().ok())
        .map(|value| value.trim_end_matches('\0').trim().to_string())
}

fn present_text(
    obj: &DefaultDicomObject,
    path: &Path,
    tag: Tag,
    attribute: &'static str,
) -> Result<String, HeaderError> {
    text(obj, tag).ok_or_else(|| HeaderError::MissingAttribute {
        path: path.display().to_string(),
        attribute,
    })
}

fn required_text(
    obj: &DefaultDicomObject,
    path: &Path,
    tag: Tag,
    attribute: &'static str,
) -> Result<String, HeaderError> {
    match present_text(obj, path, tag, attribute)? {
        value if value.is_empty() => Err(HeaderError::MissingAttribute {
            path: path.display().to_string(),
            attribute,
        }),
        value => Ok(value),
    }
}

/// Whether a walk entry is a regular file, following file symlinks
///
/// Symlinks to directories are not descended into.
///
/// # Errors
///
/// Fails for a dangling symlink.
pub fn resolves_to_file(entry: &walkdir::DirEntry) -> std::io::Result<bool> {
    if entry.path_is_symlink() {
        return Ok(std::fs::metadata(entry.path())?.is_file());
    }
    Ok(entry.file_type().is_file())
}

/// Outcome of visiting one directory entry
#[derive(Debug)]
pub enum ScanEntry {
    /// A DICOM file whose header was read
    Record(DicomRecordRef),

    /// A file without the DICOM magic (legitimately foreign content)
    Unsupported(PathBuf),

    /// A file with the magic that could not be parsed, a file that could not
    /// be read, or an entry that could not be visited at all
    Unreadable { path: PathBuf, reason: String },
}

/// Counters for files excluded from grouping or reorganization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SkipCounts {
    /// Files that are not DICOM at all
    pub unsupported: usize,

    /// DICOM files (or directory entries) that could not be read
    pub unreadable: usize,
}

impl SkipCounts {
    /// Total files skipped
    pub fn total(&self) -> usize {
        self.unsupported + self.unreadable
    }

    /// Counts a non-record entry; records are ignored
    pub fn record(&mut self, entry: &ScanEntry) {
        match entry {
            ScanEntry::Record(_) => {}
            ScanEntry::Unsupported(path) => {
                tracing::trace!(path = %path.display(), "Skipping non-DICOM file");
                self.unsupported += 1;
            }
            ScanEntry::Unreadable { path, reason } => {
                tracing::debug!(path = %path.display(), reason = %reason, "Skipping unreadable file");
                self.unreadable += 1;
            }
        }
    }
}

/// Lazy depth-first walk over every regular file below a root
///
/// Entries within a directory are visited in file-name order. Symlinks to
/// files are followed; dangling links count as unreadable.
pub struct DicomWalker {
    inner: walkdir::IntoIter,
}

impl DicomWalker {
    /// Creates a walker rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        let inner = WalkDir::new(root.as_ref())
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Self { inner }
    }
}

impl Iterator for DicomWalker {
    type Item = ScanEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    return Some(ScanEntry::Unreadable {
                        path,
                        reason: e.to_string(),
                    });
                }
            };
            match resolves_to_file(&entry) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    return Some(ScanEntry::Unreadable {
                        path: entry.into_path(),
                        reason: e.to_string(),
                    })
                }
            }
            let path = entry.into_path();
            return Some(match read_header(&path) {
                Ok(record) => ScanEntry::Record(record),
                Err(HeaderError::NotDicom(_)) => ScanEntry::Unsupported(path),
                Err(e) => ScanEntry::Unreadable {
                    path,
                    reason: e.to_string(),
                },
            });
        }
    }
}
