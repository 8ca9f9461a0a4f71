//! Blocking HTTP client for the tracker REST API.

use super::wire::WireIssue;
use super::{IssueSource, Projection};
use crate::config::TrackerSettings;
use crate::error::{ReportError, Result};
use crate::model::Issue;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{debug, info};

/// Issue source backed by the tracker's `GET /issues` endpoint.
///
/// The bearer credential and `Accept` header are installed once as default
/// headers; every fetch reuses the same connection pool.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    client: Client,
    base_url: String,
    max_results: Option<usize>,
}

impl TrackerClient {
    /// Build a client authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the
    /// underlying HTTP client cannot be built.
    pub fn new(settings: &TrackerSettings, token: &str) -> Result<Self> {
        let mut auth =
            HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|_| {
                ReportError::Config("tracker token contains invalid characters".to_string())
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_results: settings.max_results,
        })
    }

    /// Build a client reading the token from `settings.token_env`.
    ///
    /// # Errors
    ///
    /// Returns a config error if the variable is unset or blank.
    pub fn from_env(settings: &TrackerSettings) -> Result<Self> {
        let token = std::env::var(&settings.token_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ReportError::Config(format!("{} not set", settings.token_env)))?;
        Self::new(settings, &token)
    }

    fn issues_url(&self) -> String {
        format!("{}/issues", self.base_url)
    }
}

impl IssueSource for TrackerClient {
    fn fetch(&self, query: &str, projection: Projection) -> Result<Vec<Issue>> {
        let url = self.issues_url();
        info!(query, "Fetching issues");

        let mut params = vec![
            ("fields", projection.fields().to_string()),
            ("query", query.to_string()),
        ];
        if let Some(top) = self.max_results {
            params.push(("$top", top.to_string()));
        }

        let response = self.client.get(&url).query(&params).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReportError::http(status.as_u16(), url, body));
        }

        let wire: Vec<WireIssue> = response.json()?;
        let issues: Vec<Issue> = wire.into_iter().map(Issue::from).collect();
        debug!(count = issues.len(), "Fetched issues");
        Ok(issues)
    }
}
