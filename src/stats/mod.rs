//! Issue aggregation and cross-release comparison.
//!
//! # Submodules
//!
//! - [`aggregate`] - per-dimension counting with optional filters
//! - [`align`] - laying release tables out against a reference label set
//! - [`compare`] - created-versus-fixed pairing with fixed ratios
//!
//! Reference label sets are only used at alignment time. Raw counts keep
//! whatever labels the tracker returned.

pub mod aggregate;
pub mod align;
pub mod compare;

pub use aggregate::{
    BUG_LIKE_TYPES, CategoryCounts, IssueFilter, MultiCounts, aggregate, aggregate_all,
    aggregate_multi, is_bug_like,
};
pub use align::{AlignedTable, ReleaseTables, align, align_counts};
pub use compare::{ComparisonRecord, pair};

/// Canonical priority ordering, most severe first.
pub const PRIORITIES: [&str; 5] = ["Show-stopper", "Critical", "Major", "Normal", "Minor"];

/// Canonical issue type ordering for chart axes.
pub const TYPES: [&str; 10] = [
    "Bug",
    "Performance Problem",
    "Security Problem",
    "Exception",
    "Usability Problem",
    "Cosmetics",
    "Improvement",
    "Task",
    "Feature",
    "Plan",
];
