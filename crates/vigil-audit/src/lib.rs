pub mod alert;
pub mod schema;
pub mod summary;
pub mod validate;

pub use alert::{evaluate, requires_notification, AlertEvent, AlertSeverity, CPU_CRITICAL_BOUND};
pub use schema::{ColumnMap, Metric, ResolvedColumn};
pub use summary::{summarize, MetricSummary, SummaryReport, TOP_PEAKS};
pub use validate::{validate, InvalidCounts, ValidationReport};
