//! # Blob Store
//!
//! A flat namespace of document files. Names are relative to the store root;
//! the only nested names are the change archives under `history/`.
//!
//! Resolution of a document id is prefix based: the first file, in ascending
//! name order, whose stem starts with the id. Config building and callback
//! dispatch both go through [`BlobStore::resolve_by_id_prefix`], so a
//! callback always targets the file the editor was given.

use chrono::{DateTime, Local};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::documents::naming;
use crate::error::DocumentError;

/// Metadata of one stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub created_at: DateTime<Local>,
    pub modified_at: DateTime<Local>,
}

impl FileDescriptor {
    pub fn stem(&self) -> &str {
        naming::stem(&self.name)
    }

    pub fn extension(&self) -> &str {
        naming::extension(&self.name)
    }
}

pub trait BlobStore: Send + Sync {
    /// Top-level files, sorted by name. Directories are skipped.
    fn list(&self) -> Result<Vec<FileDescriptor>, DocumentError>;

    fn read(&self, name: &str) -> Result<Vec<u8>, DocumentError>;

    /// Replaces `name` with `bytes`. Readers see either the old or the new
    /// content, never a mix.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), DocumentError>;

    /// Copies a file from outside the store (e.g. the empty template) to `dest`.
    fn copy(&self, source: &Path, dest: &str) -> Result<(), DocumentError>;

    /// Filesystem path of `name`, for consumers that need a real file.
    fn path_of(&self, name: &str) -> PathBuf;

    fn resolve_by_id_prefix(&self, id: &str) -> Result<FileDescriptor, DocumentError> {
        if id.is_empty() {
            return Err(DocumentError::not_found(id));
        }
        self.list()?
            .into_iter()
            .find(|file| file.stem().starts_with(id))
            .ok_or_else(|| DocumentError::not_found(id))
    }
}

/// [`BlobStore`] over a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Opens the store at `root`, creating the directory when missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(FsBlobStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for FsBlobStore {
    fn list(&self) -> Result<Vec<FileDescriptor>, DocumentError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                log::warn!("Skipping non UTF-8 file name in {}", self.root.display());
                continue;
            };
            // Temporary files of an in-flight write.
            if name.starts_with(".tmp") {
                continue;
            }
            let modified_at: DateTime<Local> = meta.modified()?.into();
            let created_at = meta
                .created()
                .map(DateTime::<Local>::from)
                .unwrap_or(modified_at);
            files.push(FileDescriptor {
                name,
                created_at,
                modified_at,
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, DocumentError> {
        Ok(fs::read(self.path_of(name))?)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), DocumentError> {
        let target = self.path_of(name);
        let dir = target.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| DocumentError::Io(e.error))?;
        Ok(())
    }

    fn copy(&self, source: &Path, dest: &str) -> Result<(), DocumentError> {
        if !source.is_file() {
            return Err(DocumentError::TemplateNotFound(source.to_path_buf()));
        }
        fs::copy(source, self.path_of(dest))?;
        Ok(())
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}
