pub mod render;

pub use render::{
    render_alerts, render_csv, render_report, render_summary_text, with_header, RunOutcome,
};
