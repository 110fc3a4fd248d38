//! A file backed store of records.
//!
//! The whole store lives in one file as a JSON array. Every operation opens the file, reads all of it, and closes it
//! again before returning; nothing is cached between operations.
//!
//! Mutations truncate the file and write the full array back. There is no locking, so two processes mutating the same
//! file race and the last writer wins. A crash between the truncate and the write loses the store.

use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Seek, Write},
    path::{Path, PathBuf},
};

use crate::{
    Record,
    storage::dto::{self, DecodeError},
};

/// Owner read/write.
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// A store of records persisted as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

/// The result of [`FileStore::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The record was appended and the file rewritten.
    Added,
    /// A record with this id is already stored. The file was not modified.
    AlreadyExists(String),
}

/// The result of [`FileStore::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// This record was removed and the file rewritten.
    Removed(Record),
    /// No record has the requested id. The file was not modified.
    NotFound,
}

/// Errors raised while running a store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file could not be opened, read or written.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The store file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The file does not hold a valid array of records.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// The store file.
        path: PathBuf,
        /// The underlying error.
        source: DecodeError,
    },

    /// The records could not be serialised.
    #[error("failed to encode records: {0}")]
    Encode(#[source] serde_json::Error),
}

impl FileStore {
    /// Create a handle to the store at `path`.
    ///
    /// The file is not touched until an operation runs.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record to the store.
    ///
    /// If a record with the same id is already stored, nothing is written.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be read or written, or if its contents are not a valid array of records.
    pub fn add(&self, record: Record) -> Result<AddOutcome, StoreError> {
        let mut file = self.open_file()?;
        let content = self.read_all(&mut file)?;

        let records = if content.is_empty() {
            vec![record]
        } else {
            let mut records = self.decode(&content)?;
            if records.iter().any(|existing| existing.id() == record.id()) {
                tracing::debug!("{} already holds id {}", self.path.display(), record.id());
                return Ok(AddOutcome::AlreadyExists(record.id().to_owned()));
            }
            records.push(record);
            records
        };

        self.rewrite(&mut file, &records)?;
        tracing::info!("Added record to {}", self.path.display());
        Ok(AddOutcome::Added)
    }

    /// Read the raw contents of the store.
    ///
    /// The contents are not validated.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be opened or read.
    pub fn list(&self) -> Result<Vec<u8>, StoreError> {
        let mut file = self.open_file()?;
        self.read_all(&mut file)
    }

    /// Look up the first record with the given id.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be read, or if its contents are not a valid array of records.
    pub fn find_by_id(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let records = self.load()?;
        Ok(records.into_iter().find(|record| record.has_id(id)))
    }

    /// Remove the first record with the given id, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be read or written, or if its contents are not a valid array of records.
    pub fn remove(&self, id: &str) -> Result<RemoveOutcome, StoreError> {
        let mut file = self.open_file()?;
        let content = self.read_all(&mut file)?;
        let mut records = self.decode(&content)?;

        let Some(position) = records.iter().position(|record| record.has_id(id)) else {
            return Ok(RemoveOutcome::NotFound);
        };
        let removed = records.remove(position);

        self.rewrite(&mut file, &records)?;
        tracing::info!("Removed record {id} from {}", self.path.display());
        Ok(RemoveOutcome::Removed(removed))
    }

    fn load(&self) -> Result<Vec<Record>, StoreError> {
        let mut file = self.open_file()?;
        let content = self.read_all(&mut file)?;
        self.decode(&content)
    }

    fn open_file(&self) -> Result<File, StoreError> {
        tracing::debug!("Opening {}", self.path.display());
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(FILE_MODE);
        }
        options.open(&self.path).map_err(|e| self.io_error(e))
    }

    fn read_all(&self, file: &mut File) -> Result<Vec<u8>, StoreError> {
        let mut content = Vec::new();
        file.read_to_end(&mut content).map_err(|e| self.io_error(e))?;
        Ok(content)
    }

    fn decode(&self, content: &[u8]) -> Result<Vec<Record>, StoreError> {
        dto::decode_records(content).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the contents of the file with `records`.
    fn rewrite(&self, file: &mut File, records: &[Record]) -> Result<(), StoreError> {
        let content = dto::encode_records(records).map_err(StoreError::Encode)?;

        tracing::debug!(
            "Rewriting {} with {} records",
            self.path.display(),
            records.len()
        );

        overwrite(file, &content).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn overwrite(file: &mut File, content: &[u8]) -> io::Result<()> {
    file.set_len(0)?;
    file.rewind()?;
    file.write_all(content)
}
