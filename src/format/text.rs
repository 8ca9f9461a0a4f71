//! Console output for the `stats` command.

use crate::model::{Dimension, Issue};
use crate::stats::CategoryCounts;
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width used when `COLUMNS` is unset or unparsable.
const DEFAULT_WIDTH: usize = 100;

/// One dimension's counts, ready for printing or JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Breakdown {
    pub dimension: Dimension,
    pub counts: Vec<BreakdownEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownEntry {
    pub key: String,
    pub count: usize,
}

impl Breakdown {
    #[must_use]
    pub fn new(dimension: Dimension, counts: &CategoryCounts) -> Self {
        Self {
            dimension,
            counts: counts
                .iter()
                .map(|(key, count)| BreakdownEntry {
                    key: key.clone(),
                    count: *count,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|entry| entry.count).sum()
    }
}

/// Terminal width from `COLUMNS`, falling back to a fixed default.
#[must_use]
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Cut `title` to at most `max_width` display columns, ending in `…` when cut.
#[must_use]
pub fn truncate_title(title: &str, max_width: usize) -> String {
    if title.width() <= max_width {
        return title.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in title.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Text rendering of a breakdown, labels padded to a common width.
#[must_use]
pub fn format_breakdown(breakdown: &Breakdown) -> String {
    let key_width = breakdown
        .counts
        .iter()
        .map(|entry| entry.key.width())
        .max()
        .unwrap_or(0);

    let mut out = format!("By {}:\n", breakdown.dimension.label());
    if breakdown.counts.is_empty() {
        out.push_str("  (none)\n");
    }
    for entry in &breakdown.counts {
        let pad = key_width - entry.key.width();
        out.push_str(&format!("  {}:{} {:>5}\n", entry.key, " ".repeat(pad), entry.count));
    }
    let pad = " ".repeat(key_width.saturating_sub(5));
    out.push_str(&format!("  Total:{pad} {:>5}\n", breakdown.total()));
    out
}

/// One line per issue: id, priority, type, then the summary cut to fit `width`.
#[must_use]
pub fn format_issue_line(issue: &Issue, width: usize) -> String {
    let prefix = format!(
        "{:<12} {:<12} {:<18} ",
        issue.id,
        issue.priority().unwrap_or("-"),
        issue.issue_type().unwrap_or("-")
    );
    let remaining = width.saturating_sub(prefix.width()).max(10);
    format!("{prefix}{}", truncate_title(&issue.summary, remaining))
}
