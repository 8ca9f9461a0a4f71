//! The six report sections and the pure helpers behind them.

use super::Report;
use crate::error::{ReportError, Result};
use crate::format::markdown::{comparison_table, counts_table};
use crate::model::{DateRange, Dimension, Issue, ReleaseWindow};
use crate::stats::{
    ReleaseTables, aggregate, aggregate_all, aggregate_multi, align, is_bug_like, pair,
};
use crate::summarize::prompt;
use crate::tracker::{Predicate, Projection};
use indexmap::IndexMap;
use regex::Regex;
use std::cmp::Reverse;
use tracing::{info, warn};

const NOT_AVAILABLE: &str = "N/A";

impl Report<'_> {
    /// Subsystem and priority distribution of the latest releases.
    pub(super) fn subsystems(&self) -> Result<()> {
        let releases = &self.config.releases;
        let skip = releases
            .len()
            .saturating_sub(self.config.subsystems.release_count);

        let mut by_subsystem = ReleaseTables::new();
        let mut by_priority = ReleaseTables::new();
        for release in &releases[skip..] {
            let issues = self.fetch(&self.query().created(&release.created), Projection::Fields)?;
            let counts = aggregate_multi(&issues);
            by_subsystem.insert(release.label.clone(), counts.subsystem);
            by_priority.insert(release.label.clone(), counts.priority);
        }

        let subsystems = self.config.labels.subsystems.clone().unwrap_or_else(|| {
            derive_subsystem_labels(&by_subsystem, self.config.subsystems.max_labels)
        });
        let priorities = &self.config.labels.priorities;

        self.grouped_block(
            "Issues Created by Subsystem",
            Dimension::Subsystem,
            &subsystems,
            &by_subsystem,
        )?;
        self.grouped_block(
            "Issues Created by Priority",
            Dimension::Priority,
            priorities,
            &by_priority,
        )?;

        self.insights(|product| {
            prompt::distribution(
                product,
                "distributions of issues by subsystem created during each release",
                &by_subsystem,
            )
        })
    }

    /// Team-reported issues against their fixed subset, by priority and by type.
    pub(super) fn created_vs_fixed(&self) -> Result<()> {
        let team = self.config.filters.team.as_deref();
        let fixed_filter = Predicate::Raw(self.config.filters.fixed.clone());

        let mut created_priority = ReleaseTables::new();
        let mut created_type = ReleaseTables::new();
        let mut fixed_priority = ReleaseTables::new();
        let mut fixed_type = ReleaseTables::new();

        for release in &self.config.releases {
            let query = self.query().created(&release.created).raw(team);
            let created = self.fetch(&query, Projection::Fields)?;
            let fixed = self.fetch(&query.predicate(&fixed_filter), Projection::Fields)?;

            let label = &release.label;
            created_priority.insert(label.clone(), aggregate_all(&created, Dimension::Priority));
            created_type.insert(label.clone(), aggregate_all(&created, Dimension::Type));
            fixed_priority.insert(label.clone(), aggregate_all(&fixed, Dimension::Priority));
            fixed_type.insert(label.clone(), aggregate_all(&fixed, Dimension::Type));
        }

        let configured = &self.config.labels;
        let blocks = [
            (
                "Created vs Fixed by Priority",
                Dimension::Priority,
                &configured.priorities,
                &created_priority,
                &fixed_priority,
            ),
            (
                "Created vs Fixed by Type",
                Dimension::Type,
                &configured.types,
                &created_type,
                &fixed_type,
            ),
        ];
        for (title, dimension, labels, created, fixed) in blocks {
            let records = pair(created, fixed, labels);
            let path = self.charts.created_vs_fixed(title, labels, &records)?;
            self.document.heading(3, title)?;
            self.chart_link(title, &path)?;
            self.document.append(&comparison_table(dimension.label(), &records))?;
        }

        self.insights(|product| prompt::release_comparison(product, &created_type, &fixed_type))
    }

    /// User-reported bugs in the window right after each release.
    pub(super) fn after_release(&self) -> Result<()> {
        let windows: Vec<ReleaseWindow> = self
            .config
            .releases
            .iter()
            .filter_map(|release| release.after_release_window())
            .collect();
        if windows.is_empty() {
            warn!("No after-release windows configured");
            return self.document.append("_No after-release windows configured._");
        }
        self.user_priority_windows(
            &windows,
            "Issues Reported by Users After Release",
            "distributions of bug-like issues by priority reported by users right after each release",
        )
    }

    /// User-reported bugs between consecutive bugfix builds.
    pub(super) fn bugfix_windows(&self) -> Result<()> {
        if self.config.bugfix.windows.is_empty() {
            warn!("No bugfix windows configured");
            return self.document.append("_No bugfix windows configured._");
        }
        self.user_priority_windows(
            &self.config.bugfix.windows,
            "Issues Reported by Users Between Bugfixes",
            "distributions of bug-like issues by priority created by users between bugfixes",
        )
    }

    /// Resolved issues whose `Available in` matches the bugfix line.
    pub(super) fn fixed_in_bugfix(&self) -> Result<()> {
        let Some(pattern) = self.config.bugfix.version_pattern.as_deref() else {
            warn!("No bugfix version pattern configured");
            return self.document.append("_No bugfix version pattern configured._");
        };
        let version = bugfix_version_regex(pattern)?;
        let query = self
            .query()
            .available_in(pattern)
            .predicate(&Predicate::Tag("resolved".to_string()));
        let issues = self.fetch(&query, Projection::Fields)?;

        let rows = fixed_in_bugfix_rows(&issues, &version, &self.config.labels.priorities);
        info!(rows = rows.len(), "Issues fixed in bugfix releases");
        if rows.is_empty() {
            return self.document.append("_No resolved issues in the bugfix line._");
        }
        self.document.table(&["Available in", "Subsystem", "Priority", "Summary"], &rows)
    }

    /// Mood analysis of external user comments.
    pub(super) fn user_comments(&self) -> Result<()> {
        let window = self
            .config
            .comments
            .window
            .or_else(|| self.config.releases.last().map(|release| release.created))
            .ok_or_else(|| {
                ReportError::validation("comments.window", "required when no release is configured")
            })?;

        let issues = self.fetch(&self.query().commented(&window), Projection::FieldsWithComments)?;
        let internal_domain = self.config.comments.internal_domain.as_deref();
        let grouped = collect_user_comments(&issues, &window, internal_domain);
        let total: usize = grouped.values().map(Vec::len).sum();
        info!(issues = grouped.len(), comments = total, "Collected user comments");

        if grouped.is_empty() {
            return self.document.append(&format!("_No user comments during {window}._"));
        }

        let Some(summarizer) = self.summarizer else {
            let rows: Vec<Vec<String>> = grouped
                .iter()
                .map(|(id, texts)| vec![id.clone(), texts.len().to_string()])
                .collect();
            return self.document.table(&["Issue", "Comments"], &rows);
        };

        let product = self.product();
        let mut partials = Vec::new();
        for chunk in split_chunks(&grouped, self.config.comments.chunks) {
            partials.push(summarizer.complete(&prompt::comments(product, &chunk)?)?);
        }
        let answer = if partials.len() == 1 {
            partials.remove(0)
        } else {
            summarizer.complete(&prompt::combine_comments(product, &partials))?
        };
        self.document.heading(3, "AI Insights")?;
        self.document.append(&answer)
    }

    fn user_priority_windows(
        &self,
        windows: &[ReleaseWindow],
        title: &str,
        description: &str,
    ) -> Result<()> {
        let users = self.config.filters.users.as_deref();
        let mut tables = ReleaseTables::new();
        for window in windows {
            let query = self.query().created(&window.range).raw(users);
            let issues = self.fetch(&query, Projection::Fields)?;
            tables.insert(
                window.label.clone(),
                aggregate(&issues, Dimension::Priority, is_bug_like),
            );
        }

        self.grouped_block(title, Dimension::Priority, &self.config.labels.priorities, &tables)?;
        self.insights(|product| prompt::distribution(product, description, &tables))
    }

    fn grouped_block(
        &self,
        title: &str,
        dimension: Dimension,
        labels: &[String],
        tables: &ReleaseTables,
    ) -> Result<()> {
        let aligned = align(tables, labels);
        let path = self.charts.grouped(title, "Issues", labels, &aligned)?;
        self.document.heading(3, title)?;
        self.chart_link(title, &path)?;
        self.document.append(&counts_table(dimension.label(), labels, &aligned))
    }
}

/// Subsystem axis derived from the data: total count descending, first seen
/// first on ties, at most `max` labels.
#[must_use]
pub fn derive_subsystem_labels(tables: &ReleaseTables, max: usize) -> Vec<String> {
    let mut totals: IndexMap<&str, usize> = IndexMap::new();
    for counts in tables.values() {
        for (label, count) in counts {
            *totals.entry(label.as_str()).or_insert(0) += count;
        }
    }
    let mut labels: Vec<(&str, usize)> = totals.into_iter().collect();
    labels.sort_by_key(|(_, total)| Reverse(*total));
    labels
        .into_iter()
        .take(max)
        .map(|(label, _)| label.to_string())
        .collect()
}

/// Regex matching one version of the bugfix line.
///
/// `*` in `pattern` matches any run of characters up to a space or comma;
/// everything else is literal, so `2024.2.*` matches `2024.2.1` but not the
/// trailing separator of a joined `Available in` value.
///
/// # Errors
///
/// Returns a validation error if the resulting expression does not compile.
pub fn bugfix_version_regex(pattern: &str) -> Result<Regex> {
    let source = pattern
        .trim()
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[^\s,]*");
    Regex::new(&source)
        .map_err(|err| ReportError::validation("bugfix.version_pattern", err.to_string()))
}

/// Rows `Available in | Subsystem | Priority | Summary` for issues carrying a
/// matching version, sorted by version, subsystem, then priority rank
/// (unknown priorities last).
#[must_use]
pub fn fixed_in_bugfix_rows<S: AsRef<str>>(
    issues: &[Issue],
    version: &Regex,
    priorities: &[S],
) -> Vec<Vec<String>> {
    let rank = |priority: Option<&str>| {
        priority
            .and_then(|p| priorities.iter().position(|known| known.as_ref() == p))
            .unwrap_or(priorities.len())
    };

    let mut matched: Vec<(&str, &Issue)> = issues
        .iter()
        .filter_map(|issue| {
            let found = version.find(issue.available_in()?)?;
            Some((found.as_str(), issue))
        })
        .collect();
    fn subsystem(issue: &Issue) -> &str {
        issue.subsystem().unwrap_or(NOT_AVAILABLE)
    }
    matched.sort_by(|(va, a), (vb, b)| {
        va.cmp(vb)
            .then_with(|| subsystem(a).cmp(subsystem(b)))
            .then_with(|| rank(a.priority()).cmp(&rank(b.priority())))
    });

    matched
        .into_iter()
        .map(|(found, issue)| {
            vec![
                found.to_string(),
                issue.subsystem().unwrap_or(NOT_AVAILABLE).to_string(),
                issue.priority().unwrap_or(NOT_AVAILABLE).to_string(),
                issue.summary.clone(),
            ]
        })
        .collect()
}

/// Comment texts per issue id, first-seen order, keeping only comments made
/// inside `window` by a known author outside `internal_domain`.
#[must_use]
pub fn collect_user_comments(
    issues: &[Issue],
    window: &DateRange,
    internal_domain: Option<&str>,
) -> IndexMap<String, Vec<String>> {
    let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
    for issue in issues {
        for comment in &issue.comments {
            let Some(created_at) = comment.created_at else {
                continue;
            };
            let Some(author) = comment.author.as_deref() else {
                continue;
            };
            if !window.contains(&created_at) {
                continue;
            }
            if internal_domain.is_some_and(|domain| !domain.is_empty() && author.contains(domain)) {
                continue;
            }
            grouped.entry(issue.id.clone()).or_default().push(comment.text.clone());
        }
    }
    grouped
}

/// Split `grouped` into at most `parts` runs whose sizes differ by at most one.
#[must_use]
pub fn split_chunks(
    grouped: &IndexMap<String, Vec<String>>,
    parts: usize,
) -> Vec<IndexMap<String, Vec<String>>> {
    if grouped.is_empty() {
        return Vec::new();
    }
    let parts = parts.clamp(1, grouped.len());
    let base = grouped.len() / parts;
    let extra = grouped.len() % parts;

    let mut entries = grouped.iter();
    (0..parts)
        .map(|index| {
            let size = base + usize::from(index < extra);
            entries
                .by_ref()
                .take(size)
                .map(|(id, texts)| (id.clone(), texts.clone()))
                .collect()
        })
        .collect()
}
