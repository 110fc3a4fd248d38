mod dto;
pub use dto::{DecodeError, parse_item};
pub(crate) use dto::encode_record;

mod file;
pub use file::{AddOutcome, FileStore, RemoveOutcome, StoreError};
