//! Narrative summaries of aggregated tables.
//!
//! A [`Summarizer`] turns a fixed conversation into markdown. Prompts are
//! assembled in [`prompt`]; [`openai`] sends them to a chat-completions API.

pub mod openai;
pub mod prompt;

pub use openai::OpenAiSummarizer;

use crate::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Anything that answers a conversation with markdown text.
pub trait Summarizer {
    /// # Errors
    ///
    /// Returns an error when the backend fails or returns no answer.
    fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

impl<F> Summarizer for F
where
    F: Fn(&[ChatMessage]) -> Result<String>,
{
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self(messages)
    }
}
