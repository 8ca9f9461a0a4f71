//! OpenAI-compatible chat-completions client.

use super::{ChatMessage, Summarizer};
use crate::config::SummarizerSettings;
use crate::error::{ReportError, Result};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Summarizer backed by `POST {base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    client: Client,
    url: String,
    model: String,
}

impl OpenAiSummarizer {
    /// # Errors
    ///
    /// Returns an error if the key is not a valid header value or the HTTP
    /// client cannot be built.
    pub fn new(settings: &SummarizerSettings, api_key: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| {
                ReportError::Config("summarizer API key contains invalid characters".to_string())
            })?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
        })
    }

    /// Build a summarizer reading the key from `settings.api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns a config error if the variable is unset or blank.
    pub fn from_env(settings: &SummarizerSettings) -> Result<Self> {
        let key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ReportError::Config(format!("{} not set", settings.api_key_env)))?;
        Self::new(settings, &key)
    }
}

impl Summarizer for OpenAiSummarizer {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        info!(model = %self.model, messages = messages.len(), "Requesting summary");
        let request = ChatRequest {
            model: &self.model,
            messages,
        };

        let response = self.client.post(&self.url).json(&request).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReportError::http(status.as_u16(), self.url.clone(), body));
        }

        let body: ChatResponse = response.json()?;
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ReportError::Summarizer("response contained no choices".to_string()))?;
        let content = choice
            .message
            .content
            .ok_or_else(|| ReportError::Summarizer("first choice has no content".to_string()))?;
        debug!(chars = content.len(), "Received summary");
        Ok(content)
    }
}
