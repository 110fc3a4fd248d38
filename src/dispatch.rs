//! Turns the raw command-line inputs into a validated [`Invocation`] and runs it against a [`FileStore`].
//!
//! There are two kinds of failure. A [`UsageError`] means the inputs were wrong and nothing was attempted. An
//! [`OperationError`] means the operation started and then failed; the caller decides whether to report it or
//! propagate it.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use non_empty_string::NonEmptyString;

use crate::{
    domain::{Field, Operation, UnknownOperation},
    storage::{self, AddOutcome, DecodeError, FileStore, RemoveOutcome, StoreError},
};

/// The named inputs, as supplied on the command line.
///
/// An empty string is treated the same as a missing value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    /// The operation name: `add`, `list`, `findById` or `remove`.
    pub operation: Option<String>,
    /// JSON payload of the record to add.
    pub item: Option<String>,
    /// Path to the backing file.
    pub file_name: Option<String>,
    /// Target id for `findById` and `remove`.
    pub id: Option<String>,
}

/// A fully validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Add the record described by `item`.
    Add {
        /// The store file.
        file: PathBuf,
        /// The JSON payload, not yet decoded.
        item: NonEmptyString,
    },
    /// Print the raw contents of the store.
    List {
        /// The store file.
        file: PathBuf,
    },
    /// Print the record with the given id.
    FindById {
        /// The store file.
        file: PathBuf,
        /// The id to look up.
        id: NonEmptyString,
    },
    /// Remove the record with the given id.
    Remove {
        /// The store file.
        file: PathBuf,
        /// The id to remove.
        id: NonEmptyString,
    },
}

/// The inputs are incomplete or name an unknown operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// A required input is missing or empty.
    #[error("-{0} flag has to be specified")]
    Missing(Field),

    /// The operation name is not recognised.
    #[error(transparent)]
    UnknownOperation(#[from] UnknownOperation),
}

/// An operation was attempted and failed part way.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// The `item` payload is not a valid record.
    #[error("invalid item: {0}")]
    Item(#[source] DecodeError),

    /// The store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The result could not be encoded.
    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),

    /// The result could not be written to the output.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl Arguments {
    fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Operation => &self.operation,
            Field::Item => &self.item,
            Field::FileName => &self.file_name,
            Field::Id => &self.id,
        };
        value.as_deref().filter(|value| !value.is_empty())
    }

    fn require(&self, field: Field) -> Result<NonEmptyString, UsageError> {
        self.get(field)
            .and_then(|value| NonEmptyString::new(value.to_string()).ok())
            .ok_or(UsageError::Missing(field))
    }

    /// Check that every input the selected operation needs is present, before anything touches the filesystem.
    ///
    /// # Errors
    ///
    /// Returns the first missing input, in the order given by [`Operation::required_fields`], or an error if the
    /// operation is unknown.
    pub fn validate(&self) -> Result<Invocation, UsageError> {
        let operation: Operation = self
            .get(Field::Operation)
            .ok_or(UsageError::Missing(Field::Operation))?
            .parse()?;

        if let Some(&missing) = operation
            .required_fields()
            .iter()
            .find(|&&field| self.get(field).is_none())
        {
            return Err(UsageError::Missing(missing));
        }

        let file = PathBuf::from(self.require(Field::FileName)?.as_str());

        let invocation = match operation {
            Operation::Add => Invocation::Add {
                file,
                item: self.require(Field::Item)?,
            },
            Operation::List => Invocation::List { file },
            Operation::FindById => Invocation::FindById {
                file,
                id: self.require(Field::Id)?,
            },
            Operation::Remove => Invocation::Remove {
                file,
                id: self.require(Field::Id)?,
            },
        };

        Ok(invocation)
    }
}

impl Invocation {
    /// The operation this invocation runs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Add { .. } => Operation::Add,
            Self::List { .. } => Operation::List,
            Self::FindById { .. } => Operation::FindById,
            Self::Remove { .. } => Operation::Remove,
        }
    }

    /// The store file this invocation reads or writes.
    #[must_use]
    pub fn file(&self) -> &Path {
        match self {
            Self::Add { file, .. }
            | Self::List { file }
            | Self::FindById { file, .. }
            | Self::Remove { file, .. } => file.as_path(),
        }
    }
}

/// Run an invocation and write its human-readable result to `out`.
///
/// - `add` writes `Item with id <id> already exists` if the id is taken, and nothing otherwise.
/// - `list` writes the raw file contents.
/// - `findById` writes the matching record as JSON, or nothing if there is no match.
/// - `remove` writes `Item with id <id> not found` if there is no match, and nothing otherwise.
///
/// # Errors
///
/// Fails if the item payload is invalid, the store can't be read, decoded or written, or the output can't be written.
/// A failure in the payload or while reading the store leaves the file unmodified.
pub fn perform<W: Write>(invocation: &Invocation, out: &mut W) -> Result<(), OperationError> {
    let store = FileStore::open(invocation.file());
    tracing::debug!(
        "Running {} against {}",
        invocation.operation(),
        store.path().display()
    );

    match invocation {
        Invocation::Add { item, .. } => {
            let record = storage::parse_item(item.as_str()).map_err(OperationError::Item)?;
            if let AddOutcome::AlreadyExists(id) = store.add(record)? {
                write!(out, "Item with id {} already exists", id.as_str())?;
            }
        }
        Invocation::List { .. } => {
            let content = store.list()?;
            if !content.is_empty() {
                out.write_all(&content)?;
            }
        }
        Invocation::FindById { id, .. } => {
            if let Some(record) = store.find_by_id(id.as_str())? {
                let content = storage::encode_record(&record).map_err(OperationError::Encode)?;
                out.write_all(&content)?;
            }
        }
        Invocation::Remove { id, .. } => {
            if store.remove(id.as_str())? == RemoveOutcome::NotFound {
                write!(out, "Item with id {} not found", id.as_str())?;
            }
        }
    }

    out.flush()?;
    Ok(())
}
