//! Output formatting for `quality_report`.
//!
//! - [`markdown`] - the append-only report document and pipe tables
//! - [`chart`] - SVG bar charts saved beside the document
//! - [`text`] - console output for the `stats` command

pub mod chart;
pub mod markdown;
mod text;

pub use chart::ChartWriter;
pub use markdown::ReportDocument;
pub use text::{
    Breakdown, BreakdownEntry, format_breakdown, format_issue_line, terminal_width, truncate_title,
};
