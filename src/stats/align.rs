//! Cross-release alignment against a reference label ordering.

use super::CategoryCounts;
use indexmap::IndexMap;
use tracing::debug;

/// Per-release count tables, in caller-supplied release order.
pub type ReleaseTables = IndexMap<String, CategoryCounts>;

/// Per-release counts laid out positionally against a reference label set.
pub type AlignedTable = IndexMap<String, Vec<usize>>;

/// Lay one table out against `reference`, zero for missing labels.
///
/// Labels outside the reference set are dropped.
#[must_use]
pub fn align_counts<S: AsRef<str>>(counts: &CategoryCounts, reference: &[S]) -> Vec<usize> {
    reference
        .iter()
        .map(|label| counts.get(label.as_ref()).copied().unwrap_or(0))
        .collect()
}

/// Align every release table against `reference`, keeping release order.
#[must_use]
pub fn align<S: AsRef<str>>(tables: &ReleaseTables, reference: &[S]) -> AlignedTable {
    tables
        .iter()
        .map(|(release, counts)| {
            let dropped: Vec<&str> = counts
                .keys()
                .map(String::as_str)
                .filter(|label| !reference.iter().any(|r| r.as_ref() == *label))
                .collect();
            if !dropped.is_empty() {
                debug!(release = %release, ?dropped, "Labels outside reference set");
            }
            (release.clone(), align_counts(counts, reference))
        })
        .collect()
}
