use std::{fmt, str::FromStr};

/// The operations the store supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Append a record, unless one with the same id already exists.
    Add,
    /// Print the raw contents of the store.
    List,
    /// Print the record with a given id.
    FindById,
    /// Delete the record with a given id.
    Remove,
}

/// The named inputs an invocation can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Which [`Operation`] to run.
    Operation,
    /// JSON payload of the record to add.
    Item,
    /// Path to the backing file.
    FileName,
    /// Target id for lookups and removals.
    Id,
}

impl Operation {
    /// The inputs that must be present (and non-empty) for this operation, in the order they are checked.
    #[must_use]
    pub const fn required_fields(self) -> &'static [Field] {
        match self {
            Self::Add => &[Field::Item, Field::FileName],
            Self::List => &[Field::FileName],
            Self::FindById | Self::Remove => &[Field::Id, Field::FileName],
        }
    }

    /// The name used to select this operation on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::List => "list",
            Self::FindById => "findById",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when an operation name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Operation {0} not allowed!")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "list" => Ok(Self::List),
            "findById" => Ok(Self::FindById),
            "remove" => Ok(Self::Remove),
            other => Err(UnknownOperation(other.to_string())),
        }
    }
}

impl Field {
    /// The flag name for this input, without leading dashes.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Operation => "operation",
            Self::Item => "item",
            Self::FileName => "fileName",
            Self::Id => "id",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.flag())
    }
}
