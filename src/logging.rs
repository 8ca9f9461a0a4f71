//! Logging setup for `qreport`.
//!
//! Human-readable events go to stderr; stdout carries only the report path or
//! `--json` payloads. An optional log file receives the same events as JSON
//! lines and is appended to across runs.
//!
//! Filter precedence: `QREPORT_LOG`, then `RUST_LOG`, then the verbosity flags.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable with a tracing filter for this binary only.
pub const LOG_ENV: &str = "QREPORT_LOG";

/// Logging options taken from the global command-line flags.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub verbosity: u8,
    pub quiet: bool,
    pub file: Option<PathBuf>,
}

impl LogSettings {
    #[must_use]
    pub fn new(verbosity: u8, quiet: bool, file: Option<&Path>) -> Self {
        Self {
            verbosity,
            quiet,
            file: file.map(Path::to_path_buf),
        }
    }

    /// Filter directives implied by the flags alone.
    #[must_use]
    pub fn default_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "quality_report=info",
            1 => "quality_report=debug",
            2 => "quality_report=debug,reqwest=debug",
            _ => "quality_report=trace,reqwest=trace",
        }
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let from_env = [LOG_ENV, EnvFilter::DEFAULT_ENV].into_iter().find_map(|var| {
            std::env::var(var)
                .ok()
                .filter(|directives| !directives.trim().is_empty())
                .map(|directives| (var, directives))
        });
        if let Some((var, directives)) = from_env {
            return EnvFilter::try_new(&directives)
                .with_context(|| format!("invalid filter in {var}: {directives}"));
        }
        Ok(EnvFilter::try_new(self.default_filter())?)
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if a filter is malformed, the log file cannot be opened,
/// or a global subscriber is already installed.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(settings.verbosity > 1)
        .with_ansi(std::io::stderr().is_terminal());

    let file_layer = match &settings.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .json(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(settings.env_filter()?)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;
    Ok(())
}

/// Route events to the test harness's captured output.
pub fn init_test_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("quality_report=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}
