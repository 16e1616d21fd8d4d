pub mod record;
pub mod summary;

pub use record::{FieldMap, Record, RecordField};
pub use summary::Summary;
