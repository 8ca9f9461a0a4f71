//! Command-line interface for `qreport`.

pub mod commands;

use crate::config::CliOverrides;
use crate::model::Dimension;
use crate::report::Section;
use crate::stats::IssueFilter;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Release quality reports from an issue tracker.
#[derive(Parser, Debug)]
#[command(name = "qreport", author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write JSON logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Project config file (default: ./qreport.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Tracker project, overriding the config file
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Tracker REST API root, overriding the config file
    #[arg(long, global = true, value_name = "URL")]
    pub tracker_url: Option<String>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the markdown report
    Generate(GenerateArgs),

    /// Fetch one query and print its breakdown
    Stats(StatsArgs),

    /// Print the JSON Schema of the config file
    Schema,
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Render only these sections (repeatable)
    #[arg(long = "section", value_enum, value_name = "NAME")]
    pub sections: Vec<Section>,

    /// Directory for the report and its images
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip narrative summaries
    #[arg(long)]
    pub no_ai: bool,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Tracker query, e.g. "project:ReSharper and created: 2024-04-10 .. 2024-08-14"
    #[arg(long)]
    pub query: String,

    /// Dimension to count by
    #[arg(long, value_enum, default_value = "priority")]
    pub by: Dimension,

    /// Issue filter applied before counting
    #[arg(long, value_enum, default_value_t)]
    pub filter: IssueFilter,

    /// Shorthand for --filter bug-like
    #[arg(long, conflicts_with = "filter")]
    pub bug_like: bool,

    /// Also list matching issues
    #[arg(long)]
    pub list: bool,
}

impl StatsArgs {
    #[must_use]
    pub fn effective_filter(&self) -> IssueFilter {
        if self.bug_like {
            IssueFilter::BugLike
        } else {
            self.filter
        }
    }
}

impl Cli {
    /// Config overrides from global flags and, for `generate`, its options.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides {
            config: self.config.clone(),
            project: self.project.clone(),
            tracker_url: self.tracker_url.clone(),
            ..CliOverrides::default()
        };
        if let Commands::Generate(args) = &self.command {
            overrides.output_dir.clone_from(&args.output_dir);
            overrides.no_ai = args.no_ai;
            overrides.sections.clone_from(&args.sections);
        }
        overrides
    }
}
