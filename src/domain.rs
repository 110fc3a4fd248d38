mod record;
pub use record::Record;

mod operation;
pub use operation::{Field, Operation, UnknownOperation};
