//! Created-versus-fixed comparison records.

use super::align::{ReleaseTables, align_counts};
use super::CategoryCounts;
use serde::Serialize;

/// Created and fixed counts for one release and one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRecord {
    pub release: String,
    pub category: String,
    pub created: usize,
    pub fixed: usize,
}

impl ComparisonRecord {
    /// Share of created issues that were fixed; `0.0` when nothing was created.
    #[must_use]
    pub fn fixed_ratio(&self) -> f64 {
        if self.created == 0 {
            0.0
        } else {
            self.fixed as f64 / self.created as f64
        }
    }

    /// [`Self::fixed_ratio`] as a percentage.
    #[must_use]
    pub fn fixed_percent(&self) -> f64 {
        self.fixed_ratio() * 100.0
    }
}

/// Pair created and fixed tables release by release, category by category.
///
/// Releases come from `created` first, then any that only appear in `fixed`.
/// A release missing on one side reads as all zeros on that side.
#[must_use]
pub fn pair<S: AsRef<str>>(
    created: &ReleaseTables,
    fixed: &ReleaseTables,
    reference: &[S],
) -> Vec<ComparisonRecord> {
    let empty = CategoryCounts::new();
    let releases = created
        .keys()
        .chain(fixed.keys().filter(|release| !created.contains_key(*release)));

    let mut records = Vec::with_capacity(reference.len() * (created.len() + fixed.len()));
    for release in releases {
        let created_row = align_counts(created.get(release).unwrap_or(&empty), reference);
        let fixed_row = align_counts(fixed.get(release).unwrap_or(&empty), reference);

        for ((label, created), fixed) in reference.iter().zip(created_row).zip(fixed_row) {
            records.push(ComparisonRecord {
                release: release.clone(),
                category: label.as_ref().to_string(),
                created,
                fixed,
            });
        }
    }

    records
}
