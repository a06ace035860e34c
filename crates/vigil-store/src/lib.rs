pub mod model;
pub mod sqlite;

pub use model::{FieldValue, MetricRecord, RecordBatch};
pub use sqlite::{RecordStore, SqliteStore};
