//! Plain-file Record Keeping
//!
//! Records (an id, an email address and an age) are stored as a JSON array in a single file.

mod domain;
pub use domain::{Field, Operation, Record, UnknownOperation};

mod storage;
pub use storage::{AddOutcome, DecodeError, FileStore, RemoveOutcome, StoreError, parse_item};

mod dispatch;
pub use dispatch::{Arguments, Invocation, OperationError, UsageError, perform};
