//! Scoped allocator for intermediate directories

use crate::domain::{ObscuraError, Result};
use std::path::PathBuf;
use tempfile::TempDir;

/// Intermediate directories owned by one pipeline run
///
/// Every directory handed out is removed by [`ScratchSpace::close`], or by
/// `Drop` if the run unwinds before reaching it.
#[derive(Debug, Default)]
pub struct ScratchSpace {
    base: Option<PathBuf>,
    dirs: Vec<TempDir>,
}

impl ScratchSpace {
    /// Allocates under `base`, or under the system temp directory when `None`
    pub fn new(base: Option<PathBuf>) -> Self {
        Self {
            base,
            dirs: Vec::new(),
        }
    }

    /// Creates a fresh empty directory named after `label`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn allocate(&mut self, label: &str) -> Result<PathBuf> {
        let prefix = format!("obscura-{label}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match &self.base {
            Some(base) => {
                std::fs::create_dir_all(base).map_err(|e| {
                    ObscuraError::Io(format!(
                        "Failed to create scratch directory {}: {e}",
                        base.display()
                    ))
                })?;
                builder.tempdir_in(base)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| ObscuraError::Io(format!("Failed to allocate scratch directory: {e}")))?;

        let path = dir.path().to_path_buf();
        tracing::debug!(label, path = %path.display(), "Allocated scratch directory");
        self.dirs.push(dir);
        Ok(path)
    }

    /// Number of directories currently held
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// Whether no directory is held
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Removes every directory, continuing past failures
    ///
    /// Returns the number of directories that could not be removed; each
    /// failure is logged.
    pub fn close(&mut self) -> usize {
        let mut failures = 0;
        for dir in self.dirs.drain(..) {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed scratch directory"),
                Err(e) => {
                    failures += 1;
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to remove scratch directory"
                    );
                }
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_close() {
        let base = TempDir::new().unwrap();
        let mut scratch = ScratchSpace::new(Some(base.path().to_path_buf()));

        let a = scratch.allocate("redacted").unwrap();
        let b = scratch.allocate("anonymized").unwrap();
        std::fs::write(a.join("file.dcm"), b"x").unwrap();

        assert_ne!(a, b);
        assert!(a.is_dir() && b.is_dir());
        assert!(a
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("obscura-redacted-"));
        assert_eq!(scratch.len(), 2);

        assert_eq!(scratch.close(), 0);
        assert!(!a.exists());
        assert!(!b.exists());
        assert!(scratch.is_empty());
    }

    #[test]
    fn test_drop_removes_directories() {
        let base = TempDir::new().unwrap();
        let path = {
            let mut scratch = ScratchSpace::new(Some(base.path().to_path_buf()));
            scratch.allocate("tmp").unwrap()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_base_is_created() {
        let base = TempDir::new().unwrap();
        let nested = base.path().join("a").join("b");
        let mut scratch = ScratchSpace::new(Some(nested.clone()));
        let dir = scratch.allocate("x").unwrap();
        assert!(dir.starts_with(&nested));
    }
}
