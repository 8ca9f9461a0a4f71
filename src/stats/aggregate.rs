//! Issue classification and counting.

use crate::model::{Dimension, Issue};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Label to count, in first-seen order.
pub type CategoryCounts = IndexMap<String, usize>;

/// Issue types that count as quality defects.
///
/// Improvements, tasks, features, plans, and cosmetics are process items and
/// stay out of defect counts.
pub const BUG_LIKE_TYPES: [&str; 4] = [
    "Bug",
    "Performance Problem",
    "Usability Problem",
    "Exception",
];

/// Whether the issue type is one of [`BUG_LIKE_TYPES`].
#[must_use]
pub fn is_bug_like(issue: &Issue) -> bool {
    issue
        .issue_type()
        .is_some_and(|issue_type| BUG_LIKE_TYPES.contains(&issue_type))
}

/// Predefined issue filters selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum IssueFilter {
    #[default]
    All,
    BugLike,
}

impl IssueFilter {
    #[must_use]
    pub fn matches(self, issue: &Issue) -> bool {
        match self {
            Self::All => true,
            Self::BugLike => is_bug_like(issue),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::BugLike => "bug-like",
        }
    }
}

impl fmt::Display for IssueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count issues passing `predicate` by their `dimension` value.
///
/// Issues without a value for the dimension contribute nothing, not even a
/// zero entry.
pub fn aggregate<P>(issues: &[Issue], dimension: Dimension, predicate: P) -> CategoryCounts
where
    P: Fn(&Issue) -> bool,
{
    let mut counts = CategoryCounts::new();

    for issue in issues {
        if !predicate(issue) {
            continue;
        }
        if let Some(label) = issue.dimension(dimension) {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
    }

    counts
}

/// Count every issue by `dimension`.
#[must_use]
pub fn aggregate_all(issues: &[Issue], dimension: Dimension) -> CategoryCounts {
    aggregate(issues, dimension, |_| true)
}

/// Priority and subsystem counts from one pass over the issues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MultiCounts {
    pub priority: CategoryCounts,
    pub subsystem: CategoryCounts,
}

/// Count by priority and by subsystem in a single pass.
///
/// Each dimension is independent: an issue without a priority still counts
/// toward its subsystem, and vice versa.
#[must_use]
pub fn aggregate_multi(issues: &[Issue]) -> MultiCounts {
    let mut counts = MultiCounts::default();

    for issue in issues {
        if let Some(priority) = issue.priority() {
            *counts.priority.entry(priority.to_string()).or_insert(0) += 1;
        }
        if let Some(subsystem) = issue.subsystem() {
            *counts.subsystem.entry(subsystem.to_string()).or_insert(0) += 1;
        }
    }

    counts
}
