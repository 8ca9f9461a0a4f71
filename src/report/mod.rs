//! Report generation.
//!
//! A [`Report`] ties one configuration to an [`IssueSource`], an optional
//! [`Summarizer`] and the output document, then renders the configured
//! [`Section`]s in order. Each section fetches, aggregates, charts and writes
//! its own part of the document; see [`sections`].

mod sections;

pub use sections::{
    bugfix_version_regex, collect_user_comments, derive_subsystem_labels, fixed_in_bugfix_rows,
    split_chunks,
};

use crate::config::ReportConfig;
use crate::error::Result;
use crate::format::{ChartWriter, ReportDocument};
use crate::model::Issue;
use crate::summarize::{ChatMessage, Summarizer};
use crate::tracker::{IssueSource, Projection, QueryBuilder};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One part of the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    /// Subsystem and priority distribution of the latest releases.
    Subsystems,
    /// Team-reported issues against the fixed subset, per release.
    CreatedVsFixed,
    /// User-reported bugs right after each release.
    AfterRelease,
    /// User-reported bugs between bugfix builds.
    BugfixWindows,
    /// Resolved issues shipped in the bugfix line.
    FixedInBugfix,
    /// Mood of user comments during the comment window.
    UserComments,
}

impl Section {
    pub const ALL: [Self; 6] = [
        Self::Subsystems,
        Self::CreatedVsFixed,
        Self::AfterRelease,
        Self::BugfixWindows,
        Self::FixedInBugfix,
        Self::UserComments,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subsystems => "subsystems",
            Self::CreatedVsFixed => "created-vs-fixed",
            Self::AfterRelease => "after-release",
            Self::BugfixWindows => "bugfix-windows",
            Self::FixedInBugfix => "fixed-in-bugfix",
            Self::UserComments => "user-comments",
        }
    }

    /// Heading used in the document and its table of contents.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Subsystems => "Issues by Subsystem",
            Self::CreatedVsFixed => "Created vs Fixed",
            Self::AfterRelease => "Issues Reported After Release",
            Self::BugfixWindows => "Issues Reported Between Bugfixes",
            Self::FixedInBugfix => "Issues Fixed in Bugfix Releases",
            Self::UserComments => "User Comments",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One report run.
pub struct Report<'a> {
    config: &'a ReportConfig,
    source: &'a dyn IssueSource,
    summarizer: Option<&'a dyn Summarizer>,
    document: ReportDocument,
    charts: ChartWriter,
}

impl<'a> Report<'a> {
    /// Create the output document for `config` dated `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document or its image directory cannot be created.
    pub fn create(
        config: &'a ReportConfig,
        source: &'a dyn IssueSource,
        summarizer: Option<&'a dyn Summarizer>,
        date: NaiveDate,
    ) -> Result<Self> {
        let path = config.output.dir.join(&config.output.file_name);
        let titles: Vec<&str> = config.sections.iter().map(|section| section.title()).collect();
        let document = ReportDocument::create(path, &config.output.title, date, &titles)?;
        let charts = ChartWriter::new(document.images_dir());
        Ok(Self {
            config,
            source,
            summarizer,
            document,
            charts,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.document.path()
    }

    /// Render every configured section in order.
    ///
    /// # Errors
    ///
    /// Returns the first fetch, summarizer or write failure; the document keeps
    /// whatever was written before it.
    pub fn run(&self) -> Result<PathBuf> {
        for section in &self.config.sections {
            info!(section = %section, "Rendering section");
            self.document.heading(2, section.title())?;
            match section {
                Section::Subsystems => self.subsystems()?,
                Section::CreatedVsFixed => self.created_vs_fixed()?,
                Section::AfterRelease => self.after_release()?,
                Section::BugfixWindows => self.bugfix_windows()?,
                Section::FixedInBugfix => self.fixed_in_bugfix()?,
                Section::UserComments => self.user_comments()?,
            }
        }
        info!(path = %self.path().display(), "Report complete");
        Ok(self.path().to_path_buf())
    }

    fn query(&self) -> QueryBuilder {
        QueryBuilder::new(&self.config.project)
    }

    fn fetch(&self, query: &QueryBuilder, projection: Projection) -> Result<Vec<Issue>> {
        let query = query.build();
        let issues = self.source.fetch(&query, projection)?;
        debug!(query = %query, count = issues.len(), "Fetched");
        Ok(issues)
    }

    /// Product name used in prompts.
    fn product(&self) -> &str {
        self.config
            .summarizer
            .product
            .as_deref()
            .unwrap_or(&self.config.project)
    }

    /// Append an `### AI Insights` block when a summarizer is configured.
    fn insights<F>(&self, messages: F) -> Result<()>
    where
        F: FnOnce(&str) -> Result<Vec<ChatMessage>>,
    {
        let Some(summarizer) = self.summarizer else {
            return Ok(());
        };
        let answer = summarizer.complete(&messages(self.product())?)?;
        self.document.heading(3, "AI Insights")?;
        self.document.append(&answer)
    }

    fn chart_link(&self, title: &str, path: &Path) -> Result<()> {
        self.document.image(title, path)
    }
}
