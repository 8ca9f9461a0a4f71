//! Generate command implementation.

use crate::config::{self, CliOverrides, ReportConfig};
use crate::error::Result;
use crate::report::{Report, Section};
use crate::summarize::{OpenAiSummarizer, Summarizer};
use crate::tracker::{IssueSource, TrackerClient};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Serialize)]
struct GenerateOutput<'a> {
    report: PathBuf,
    sections: &'a [Section],
    summarized: bool,
}

/// Execute the generate command.
///
/// Configuration and credentials are checked before the first fetch.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a credential is missing, or
/// any section fails.
pub fn execute(json: bool, cli: &CliOverrides) -> Result<()> {
    let config = config::load_config(cli)?;
    config.validate()?;

    let source = TrackerClient::from_env(&config.tracker)?;
    let summarizer = if config.summarizer.enabled {
        Some(OpenAiSummarizer::from_env(&config.summarizer)?)
    } else {
        None
    };

    let path = generate(
        &config,
        &source,
        summarizer.as_ref().map(|s| s as &dyn Summarizer),
        Local::now().date_naive(),
    )?;

    if json {
        let output = GenerateOutput {
            report: path,
            sections: &config.sections,
            summarized: summarizer.is_some(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

/// Render the report for `config` with the given collaborators.
///
/// # Errors
///
/// Returns the first failure from any section.
pub fn generate(
    config: &ReportConfig,
    source: &dyn IssueSource,
    summarizer: Option<&dyn Summarizer>,
    date: NaiveDate,
) -> Result<PathBuf> {
    info!(
        project = %config.project,
        sections = config.sections.len(),
        summarized = summarizer.is_some(),
        "Generating report"
    );
    Report::create(config, source, summarizer, date)?.run()
}
