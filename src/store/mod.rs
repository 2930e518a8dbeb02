//! Flat-file media store.
//!
//! A single directory acts as a key-value store keyed by filename. Writes are
//! plain create-or-truncate; a reader racing a writer may see a partial file.

mod content_type;

pub use content_type::{OCTET_STREAM, content_type};

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::constants::limits::MAX_FILENAME_BYTES;
use crate::models::{MediaKind, StoredFileInfo};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid filename: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,

    /// Bookkeeping file that lives in the same directory but is never listed.
    reserved_name: String,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, reserved_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            reserved_name: reserved_name.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn path_for(&self, filename: &str) -> Result<PathBuf, StoreError> {
        validate_filename(filename)?;
        Ok(self.root.join(filename))
    }

    pub async fn exists(&self, filename: &str) -> Result<bool, StoreError> {
        let path = self.path_for(filename)?;
        Ok(fs::try_exists(&path).await?)
    }

    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(filename)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write(&self, filename: &str, bytes: &[u8]) -> Result<StoredFileInfo, StoreError> {
        let path = self.path_for(filename)?;
        self.ensure_exists().await?;

        fs::write(&path, bytes).await?;
        info!(file = %filename, size = bytes.len(), "Stored file");

        let metadata = fs::metadata(&path).await?;
        Ok(file_info(filename, &metadata))
    }

    /// Lists every stored file except the reserved one, newest first.
    pub async fn list(&self) -> Result<Vec<StoredFileInfo>, StoreError> {
        let mut files = Vec::new();

        if !fs::try_exists(&self.root).await? {
            return Ok(files);
        }

        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name == self.reserved_name {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    debug!(file = %name, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            files.push(file_info(&name, &metadata));
        }

        files.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(files)
    }
}

fn file_info(name: &str, metadata: &std::fs::Metadata) -> StoredFileInfo {
    let modified_at: DateTime<Utc> = metadata
        .modified()
        .map_or_else(|_| Utc::now(), DateTime::<Utc>::from);
    let created_at: DateTime<Utc> = metadata
        .created()
        .map_or(modified_at, DateTime::<Utc>::from);

    StoredFileInfo {
        name: name.to_string(),
        size: metadata.len(),
        created_at,
        modified_at,
        media_type: MediaKind::from_filename(name),
        content_type: content_type(name),
    }
}

/// Rejects names that could escape the store directory or address hidden files.
pub fn validate_filename(filename: &str) -> Result<&str, StoreError> {
    let invalid = filename.is_empty()
        || filename.len() > MAX_FILENAME_BYTES
        || filename.starts_with('.')
        || filename
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control());

    if invalid {
        return Err(StoreError::InvalidName(filename.to_string()));
    }

    Ok(filename)
}
