//! Stats command implementation.
//!
//! Runs one tracker query and shows how the result breaks down along a single
//! dimension, optionally listing the issues themselves.

use crate::cli::StatsArgs;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::format::{Breakdown, format_breakdown, format_issue_line, terminal_width};
use crate::model::Issue;
use crate::stats::{IssueFilter, aggregate};
use crate::tracker::{IssueSource, Projection, TrackerClient};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct StatsOutput<'a> {
    query: &'a str,
    fetched: usize,
    filter: IssueFilter,
    breakdown: Breakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<Vec<IssueLine<'a>>>,
}

#[derive(Debug, Serialize)]
struct IssueLine<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    issue_type: Option<&'a str>,
    priority: Option<&'a str>,
    subsystem: Option<&'a str>,
    summary: &'a str,
}

impl<'a> From<&'a Issue> for IssueLine<'a> {
    fn from(issue: &'a Issue) -> Self {
        Self {
            id: &issue.id,
            issue_type: issue.issue_type(),
            priority: issue.priority(),
            subsystem: issue.subsystem(),
            summary: &issue.summary,
        }
    }
}

/// Execute the stats command against the configured tracker.
///
/// # Errors
///
/// Returns an error if configuration fails to load, the token is missing, or
/// the fetch fails.
pub fn execute(args: &StatsArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let config = config::load_config(cli)?;
    let client = TrackerClient::from_env(&config.tracker)?;
    print!("{}", render(args, json, &client)?);
    Ok(())
}

/// Fetch and format; separated from [`execute`] so any source can be used.
///
/// # Errors
///
/// Returns an error if the fetch fails or JSON output cannot be serialized.
pub fn render(args: &StatsArgs, json: bool, source: &dyn IssueSource) -> Result<String> {
    info!(query = %args.query, by = %args.by, "Computing statistics");
    let issues = source.fetch(&args.query, Projection::Fields)?;
    let filter = args.effective_filter();

    let counts = aggregate(&issues, args.by, |issue: &Issue| filter.matches(issue));
    debug!(fetched = issues.len(), labels = counts.len(), "Aggregated");
    let breakdown = Breakdown::new(args.by, &counts);

    let selected: Vec<&Issue> = if args.list {
        issues.iter().filter(|issue| filter.matches(issue)).collect()
    } else {
        Vec::new()
    };

    if json {
        let output = StatsOutput {
            query: &args.query,
            fetched: issues.len(),
            filter,
            breakdown,
            issues: args
                .list
                .then(|| selected.iter().map(|issue| IssueLine::from(*issue)).collect()),
        };
        return Ok(format!("{}\n", serde_json::to_string_pretty(&output)?));
    }

    let mut out = format!("Query: {}\nFetched: {}\n\n", args.query, issues.len());
    out.push_str(&format_breakdown(&breakdown));
    if args.list {
        let width = terminal_width();
        out.push('\n');
        for issue in selected {
            out.push_str(&format_issue_line(issue, width));
            out.push('\n');
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomField, Dimension, FieldValue};

    fn issue(id: &str, issue_type: &str, priority: &str) -> Issue {
        Issue::new(
            id,
            format!("{issue_type} {id}"),
            vec![
                CustomField::new("Type", FieldValue::Single(issue_type.to_string())),
                CustomField::new("Priority", FieldValue::Single(priority.to_string())),
            ],
            vec![],
        )
    }

    fn args(by: Dimension, bug_like: bool, list: bool) -> StatsArgs {
        StatsArgs {
            query: "project:ReSharper".to_string(),
            by,
            filter: IssueFilter::All,
            bug_like,
            list,
        }
    }

    fn source(_: &str, _: Projection) -> Result<Vec<Issue>> {
        Ok(vec![
            issue("RSRP-1", "Bug", "Major"),
            issue("RSRP-2", "Bug", "Major"),
            issue("RSRP-3", "Feature", "Minor"),
        ])
    }

    #[test]
    fn text_breakdown_by_priority() {
        let out = render(&args(Dimension::Priority, false, false), false, &source).unwrap();
        assert!(out.starts_with("Query: project:ReSharper\nFetched: 3\n"));
        assert!(out.contains("Major:     2"));
        assert!(out.contains("Minor:     1"));
    }

    #[test]
    fn json_bug_like_by_type_with_list() {
        let out = render(&args(Dimension::Type, true, true), true, &source).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["filter"], "bug-like");
        assert_eq!(value["breakdown"]["dimension"], "type");
        assert_eq!(value["breakdown"]["counts"][0]["key"], "Bug");
        assert_eq!(value["breakdown"]["counts"][0]["count"], 2);
        assert_eq!(value["breakdown"]["counts"].as_array().unwrap().len(), 1);
        assert_eq!(value["issues"].as_array().unwrap().len(), 2);
        assert_eq!(value["issues"][0]["type"], "Bug");
    }

    #[test]
    fn issues_omitted_without_list() {
        let out = render(&args(Dimension::Type, false, false), true, &source).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value.get("issues").is_none());
    }
}
