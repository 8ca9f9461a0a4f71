#![allow(dead_code)]

use quality_report::config::ReportConfig;
use std::sync::Once;
use tempfile::TempDir;

pub mod fixtures;
pub mod server;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        quality_report::logging::init_test_logging();
    });
}

/// A valid config writing into a fresh temp dir, with no summarizer.
pub fn test_config() -> (ReportConfig, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = ReportConfig {
        project: "ReSharper".to_string(),
        ..ReportConfig::default()
    };
    config.output.dir = dir.path().join("reports");
    (config, dir)
}
