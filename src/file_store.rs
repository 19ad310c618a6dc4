use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::AppError;

const STAGING_DIR: &str = ".staging";
const QUARANTINE_DIR: &str = ".orphaned";

/// Flat directory of uploaded files keyed by their generated filename.
///
/// Uploads are first written to a staging area inside the root so that
/// persisting them is a same-filesystem rename.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        fs::create_dir_all(root.join(STAGING_DIR))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.path_for(filename).is_file()
    }

    /// An empty temp file in the staging area, removed on drop unless persisted.
    pub fn staging_file(&self) -> Result<NamedTempFile, AppError> {
        Ok(NamedTempFile::new_in(self.root.join(STAGING_DIR))?)
    }

    pub fn stage_copy(&self, source: &Path) -> Result<NamedTempFile, AppError> {
        let mut staged = self.staging_file()?;
        let mut input = fs::File::open(source)?;
        io::copy(&mut input, &mut staged)?;
        staged.flush()?;
        Ok(staged)
    }

    pub fn persist(&self, staged: NamedTempFile, filename: &str) -> Result<(), AppError> {
        staged
            .persist_noclobber(self.path_for(filename))
            .map(|_| ())
            .map_err(|e| AppError::Storage(format!("Failed to store {}: {}", filename, e.error)))
    }

    /// Returns `Ok(false)` when the file was already gone.
    pub fn remove(&self, filename: &str) -> Result<bool, AppError> {
        match fs::remove_file(self.path_for(filename)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Storage(format!("Failed to delete {}: {}", filename, e))),
        }
    }

    /// Moves a stored file into the quarantine directory, out of the listing.
    pub fn quarantine(&self, filename: &str) -> Result<PathBuf, AppError> {
        let dir = self.root.join(QUARANTINE_DIR);
        fs::create_dir_all(&dir)?;
        let target = dir.join(filename);
        fs::rename(self.path_for(filename), &target)
            .map_err(|e| AppError::Storage(format!("Failed to quarantine {}: {}", filename, e)))?;
        Ok(target)
    }

    /// Names of stored files, excluding the staging area and dotfiles.
    pub fn stored_filenames(&self) -> Result<HashSet<String>, AppError> {
        let mut names = HashSet::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }
}
