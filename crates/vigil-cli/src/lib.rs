pub mod pipeline;

pub use pipeline::{build_dispatcher, run_audit, run_check, AuditRun};
