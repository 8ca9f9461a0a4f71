//! Configuration management for `quality_report`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`QREPORT_*`)
//! 3. Project config (`--config <path>`, else `./qreport.yaml`)
//! 4. User config (`~/.config/qreport/config.yaml`)
//! 5. Defaults
//!
//! YAML layers are deep-merged before deserialization, so a project file only
//! needs the keys it changes.

use crate::error::{ReportError, Result};
use crate::model::{DateRange, ReleaseWindow};
use crate::report::Section;
use crate::stats::{PRIORITIES, TYPES};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = "qreport.yaml";

/// Complete, merged report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Tracker project every query is scoped to.
    pub project: String,
    pub tracker: TrackerSettings,
    pub output: OutputSettings,
    pub labels: LabelSettings,
    pub filters: FilterSettings,
    /// Release cycles in chronological order.
    pub releases: Vec<ReleaseConfig>,
    pub subsystems: SubsystemSettings,
    pub bugfix: BugfixSettings,
    pub comments: CommentSettings,
    pub summarizer: SummarizerSettings,
    /// Sections to render, in order.
    pub sections: Vec<Section>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            tracker: TrackerSettings::default(),
            output: OutputSettings::default(),
            labels: LabelSettings::default(),
            filters: FilterSettings::default(),
            releases: Vec::new(),
            subsystems: SubsystemSettings::default(),
            bugfix: BugfixSettings::default(),
            comments: CommentSettings::default(),
            summarizer: SummarizerSettings::default(),
            sections: Section::ALL.to_vec(),
        }
    }
}

/// Issue tracker connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerSettings {
    /// REST API root, e.g. `https://youtrack.jetbrains.com/api`.
    pub base_url: String,
    /// Environment variable holding the bearer token.
    pub token_env: String,
    pub timeout_secs: u64,
    /// Result cap sent as `$top`; omit to use the tracker's own default.
    pub max_results: Option<usize>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            base_url: "https://youtrack.jetbrains.com/api".to_string(),
            token_env: "YOUTRACK_TOKEN".to_string(),
            timeout_secs: 120,
            max_results: Some(10_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// Directory receiving the document and its `images/` folder.
    pub dir: PathBuf,
    pub file_name: String,
    pub title: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
            file_name: "Quality_Report.md".to_string(),
            title: "Release Quality Analysis Report".to_string(),
        }
    }
}

/// Reference label orderings used for chart axes and table rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct LabelSettings {
    pub priorities: Vec<String>,
    pub types: Vec<String>,
    /// Fixed subsystem axis; derived from the data when absent.
    pub subsystems: Option<Vec<String>>,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            priorities: PRIORITIES.iter().map(ToString::to_string).collect(),
            types: TYPES.iter().map(ToString::to_string).collect(),
            subsystems: None,
        }
    }
}

/// Raw query predicates identifying reporter groups and fixed states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSettings {
    /// Issues reported by the product team.
    pub team: Option<String>,
    /// Issues reported by users.
    pub users: Option<String>,
    /// Narrows a query to fixed issues.
    pub fixed: String,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            team: None,
            users: None,
            fixed: "state: Fixed or state: Verified".to_string(),
        }
    }
}

/// One release cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReleaseConfig {
    pub label: String,
    /// Development window; issues created here belong to the release.
    pub created: DateRange,
    /// Window right after the release ships, for user-reported regressions.
    #[serde(default)]
    pub after_release: Option<DateRange>,
}

impl ReleaseConfig {
    #[must_use]
    pub fn after_release_window(&self) -> Option<ReleaseWindow> {
        self.after_release
            .map(|range| ReleaseWindow::new(self.label.clone(), range))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct SubsystemSettings {
    /// How many of the latest releases to compare.
    pub release_count: usize,
    /// Cap on a data-derived subsystem axis.
    pub max_labels: usize,
}

impl Default for SubsystemSettings {
    fn default() -> Self {
        Self {
            release_count: 2,
            max_labels: 15,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct BugfixSettings {
    /// `Available in` pattern of the bugfix line, e.g. `2024.2.*`.
    pub version_pattern: Option<String>,
    /// Windows between consecutive bugfix builds.
    pub windows: Vec<ReleaseWindow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct CommentSettings {
    /// Comment window; comments outside it are ignored.
    pub window: Option<DateRange>,
    /// Comments by authors containing this string are internal and ignored.
    pub internal_domain: Option<String>,
    /// Number of parts the comment set is split into for summarization.
    pub chunks: usize,
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            window: None,
            internal_domain: None,
            chunks: 4,
        }
    }
}

/// Chat-completions endpoint used for narrative summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct SummarizerSettings {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Product named in the prompts.
    pub product: Option<String>,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 300,
            product: None,
        }
    }
}

impl ReportConfig {
    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(ReportError::validation("project", "must not be empty"));
        }
        if self.tracker.base_url.trim().is_empty() {
            return Err(ReportError::validation("tracker.base_url", "must not be empty"));
        }
        if self.labels.priorities.is_empty() {
            return Err(ReportError::validation("labels.priorities", "must not be empty"));
        }
        if self.labels.types.is_empty() {
            return Err(ReportError::validation("labels.types", "must not be empty"));
        }
        if self.comments.chunks == 0 {
            return Err(ReportError::validation("comments.chunks", "must be at least 1"));
        }
        if self.subsystems.release_count == 0 {
            return Err(ReportError::validation("subsystems.release_count", "must be at least 1"));
        }
        if self.sections.contains(&Section::CreatedVsFixed)
            && self.filters.fixed.trim().is_empty()
        {
            return Err(ReportError::validation(
                "filters.fixed",
                "must not be empty when created-vs-fixed is enabled",
            ));
        }
        if self.sections.contains(&Section::UserComments)
            && self.comments.window.is_none()
            && self.releases.is_empty()
        {
            return Err(ReportError::validation(
                "comments.window",
                "required when no release is configured",
            ));
        }

        let mut seen = HashSet::new();
        for release in &self.releases {
            if release.label.trim().is_empty() {
                return Err(ReportError::validation("releases.label", "must not be empty"));
            }
            if !seen.insert(release.label.as_str()) {
                return Err(ReportError::validation(
                    "releases.label",
                    format!("duplicate release '{}'", release.label),
                ));
            }
        }

        let mut seen = HashSet::new();
        for window in &self.bugfix.windows {
            if !seen.insert(window.label.as_str()) {
                return Err(ReportError::validation(
                    "bugfix.windows.label",
                    format!("duplicate window '{}'", window.label),
                ));
            }
        }

        Ok(())
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub project: Option<String>,
    pub tracker_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub no_ai: bool,
    pub sections: Vec<Section>,
}

impl CliOverrides {
    pub fn apply(&self, config: &mut ReportConfig) {
        if let Some(project) = &self.project {
            config.project.clone_from(project);
        }
        if let Some(url) = &self.tracker_url {
            config.tracker.base_url.clone_from(url);
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir.clone_from(dir);
        }
        if self.no_ai {
            config.summarizer.enabled = false;
        }
        if !self.sections.is_empty() {
            config.sections.clone_from(&self.sections);
        }
    }
}

/// Load configuration with the documented precedence order.
///
/// # Errors
///
/// Returns an error if an explicit config file is missing, any file cannot be
/// read or parsed, or the merged document does not match the schema.
pub fn load_config(cli: &CliOverrides) -> Result<ReportConfig> {
    let mut merged = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());

    if let Some(path) = user_config_path() {
        merge_yaml(&mut merged, load_yaml_layer(&path)?);
    }

    let project_path = match &cli.config {
        Some(path) => {
            if !path.exists() {
                return Err(ReportError::Config(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            path.clone()
        }
        None => PathBuf::from(DEFAULT_CONFIG_FILENAME),
    };
    merge_yaml(&mut merged, load_yaml_layer(&project_path)?);

    let mut config: ReportConfig = serde_yaml::from_value(merged)?;
    apply_env_overrides(&mut config, |key| env::var(key).ok());
    cli.apply(&mut config);
    Ok(config)
}

/// User config path (`~/.config/qreport/config.yaml`), if `HOME` is set.
fn user_config_path() -> Option<PathBuf> {
    let home = env::var("HOME").ok().filter(|home| !home.trim().is_empty())?;
    Some(
        Path::new(&home)
            .join(".config")
            .join("qreport")
            .join("config.yaml"),
    )
}

/// Read one YAML layer. Missing files yield an empty layer.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_yaml_layer(path: &Path) -> Result<serde_yaml::Value> {
    if !path.exists() {
        return Ok(serde_yaml::Value::Null);
    }
    debug!(path = %path.display(), "Loading config layer");
    let contents = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Merge `overlay` into `base`; mappings merge key by key, anything else replaces.
pub fn merge_yaml(base: &mut serde_yaml::Value, overlay: serde_yaml::Value) {
    match (base, overlay) {
        (_, serde_yaml::Value::Null) => {}
        (serde_yaml::Value::Mapping(base_map), serde_yaml::Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Apply `QREPORT_*` environment overrides using `lookup`.
pub fn apply_env_overrides<F>(config: &mut ReportConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(project) = value("QREPORT_PROJECT") {
        config.project = project;
    }
    if let Some(url) = value("QREPORT_TRACKER_URL") {
        config.tracker.base_url = url;
    }
    if let Some(dir) = value("QREPORT_OUTPUT_DIR") {
        config.output.dir = PathBuf::from(dir);
    }
    if let Some(model) = value("QREPORT_MODEL") {
        config.summarizer.model = model;
    }
    if value("QREPORT_NO_AI").as_deref().and_then(parse_bool) == Some(true) {
        config.summarizer.enabled = false;
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn yaml(text: &str) -> serde_yaml::Value {
        serde_yaml::from_str(text).expect("parse yaml")
    }

    #[test]
    fn defaults_cover_every_section() {
        let config = ReportConfig::default();
        assert_eq!(config.sections, Section::ALL.to_vec());
        assert_eq!(config.labels.priorities.len(), 5);
        assert_eq!(config.labels.types.len(), 10);
        assert_eq!(config.tracker.token_env, "YOUTRACK_TOKEN");
        assert!(!config.summarizer.enabled);
    }

    #[test]
    fn merge_precedence_order() {
        let mut merged =
            yaml("project: user\ntracker:\n  timeout_secs: 5\n  token_env: USER_TOKEN\n");
        merge_yaml(&mut merged, yaml("project: project\ntracker:\n  timeout_secs: 30\n"));

        let config: ReportConfig = serde_yaml::from_value(merged).unwrap();
        assert_eq!(config.project, "project");
        assert_eq!(config.tracker.timeout_secs, 30);
        assert_eq!(config.tracker.token_env, "USER_TOKEN");
        assert_eq!(config.tracker.base_url, TrackerSettings::default().base_url);
    }

    #[test]
    fn empty_layer_keeps_base() {
        let mut merged = yaml("project: base\n");
        merge_yaml(&mut merged, serde_yaml::Value::Null);
        assert_eq!(merged, yaml("project: base\n"));
    }

    #[test]
    fn parses_releases_and_windows() {
        let config: ReportConfig = serde_yaml::from_str(
            r"
project: ReSharper
releases:
  - label: Release 241
    created: 2023-12-07 .. 2024-04-09
    after_release: 2024-04-10 .. 2024-04-24
  - label: Release 242
    created: 2024-04-10 .. 2024-08-14
bugfix:
  version_pattern: 2024.2.*
  windows:
    - label: 2024.2 - 2024.2.1
      range: 2024-08-15 .. 2024-08-19
sections: [created-vs-fixed, fixed-in-bugfix]
",
        )
        .unwrap();

        assert_eq!(config.releases.len(), 2);
        assert!(config.releases[0].after_release.is_some());
        assert!(config.releases[1].after_release_window().is_none());
        assert_eq!(config.bugfix.windows[0].range.to_string(), "2024-08-15 .. 2024-08-19");
        assert_eq!(config.sections, vec![Section::CreatedVsFixed, Section::FixedInBugfix]);
        config.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: std::result::Result<ReportConfig, _> = serde_yaml::from_str("projekt: typo\n");
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("QREPORT_PROJECT", "Rider"),
            ("QREPORT_OUTPUT_DIR", "/tmp/out"),
            ("QREPORT_NO_AI", "yes"),
            ("QREPORT_MODEL", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = ReportConfig::default();
        config.summarizer.enabled = true;
        apply_env_overrides(&mut config, |key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.project, "Rider");
        assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));
        assert!(!config.summarizer.enabled);
        assert_eq!(config.summarizer.model, "gpt-4o");
    }

    #[test]
    fn cli_overrides_win() {
        let mut config = ReportConfig::default();
        config.summarizer.enabled = true;
        let cli = CliOverrides {
            project: Some("dotTrace".to_string()),
            no_ai: true,
            sections: vec![Section::Subsystems],
            ..Default::default()
        };
        cli.apply(&mut config);

        assert_eq!(config.project, "dotTrace");
        assert!(!config.summarizer.enabled);
        assert_eq!(config.sections, vec![Section::Subsystems]);
    }

    #[test]
    fn validate_rejects_bad_configs() {
        let config = ReportConfig::default();
        assert!(config.validate().is_err(), "empty project");

        let mut config = ReportConfig {
            project: "ReSharper".to_string(),
            sections: vec![Section::Subsystems, Section::CreatedVsFixed],
            ..Default::default()
        };
        config.validate().unwrap();

        let release = ReleaseConfig {
            label: "Release 242".to_string(),
            created: "2024-04-10 .. 2024-08-14".parse().unwrap(),
            after_release: None,
        };
        config.releases = vec![release.clone(), release];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate release"));

        config.releases.clear();
        config.comments.chunks = 0;
        assert!(config.validate().is_err());
    }

    fn resharper(sections: Vec<Section>) -> ReportConfig {
        ReportConfig {
            project: "ReSharper".to_string(),
            sections,
            ..Default::default()
        }
    }

    #[test]
    fn comment_window_is_required_without_releases() {
        let mut config = resharper(vec![Section::FixedInBugfix, Section::UserComments]);
        config.bugfix.version_pattern = Some("2024.2.*".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid comments.window"), "{err}");

        config.comments.window = Some("2024-08-15 .. 2024-09-15".parse().unwrap());
        config.validate().unwrap();

        config.comments.window = None;
        config.releases.push(ReleaseConfig {
            label: "Release 242".to_string(),
            created: "2024-04-10 .. 2024-08-14".parse().unwrap(),
            after_release: None,
        });
        config.validate().unwrap();

        resharper(vec![Section::Subsystems]).validate().unwrap();
    }

    #[test]
    fn blank_fixed_filter_is_rejected_for_created_vs_fixed() {
        let mut config = resharper(vec![Section::CreatedVsFixed]);
        config.filters.fixed = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid filters.fixed"), "{err}");

        config.sections = vec![Section::Subsystems];
        config.validate().unwrap();
    }

    #[test]
    fn zero_release_count_is_rejected() {
        let mut config = resharper(vec![Section::Subsystems]);
        config.subsystems.release_count = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid subsystems.release_count"), "{err}");
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let temp = TempDir::new().expect("tempdir");
        let cli = CliOverrides {
            config: Some(temp.path().join("nope.yaml")),
            ..Default::default()
        };
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn example_config_is_valid() {
        let example = include_str!("../../qreport.example.yaml");
        let config: ReportConfig = serde_yaml::from_str(example).expect("example parses");
        config.validate().unwrap();

        assert_eq!(config.releases.len(), 2);
        let window = config.releases[1].after_release_window().expect("after-release window");
        assert_eq!(window.label, "Release 242");
        assert_eq!(config.bugfix.windows[0].label, "2024.2.1");
        assert_eq!(config.comments.internal_domain.as_deref(), Some("jetbrains.com"));
        assert_eq!(config.sections, Section::ALL.to_vec());
    }

    #[test]
    fn missing_layer_is_empty() {
        let temp = TempDir::new().expect("tempdir");
        let layer = load_yaml_layer(&temp.path().join("absent.yaml")).unwrap();
        assert_eq!(layer, serde_yaml::Value::Null);
    }
}
