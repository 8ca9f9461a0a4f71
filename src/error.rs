//! Error types for `quality_report`.
//!
//! Every fallible operation in the library returns [`Result`]. The binary maps
//! each [`ReportError`] to an [`ErrorCode`], which carries the process exit code.

use serde::Serialize;
use thiserror::Error;

/// Longest response body excerpt kept in an [`ReportError::Http`].
const HTTP_BODY_LIMIT: usize = 512;

/// Crate-wide result alias.
pub type Result<T, E = ReportError> = std::result::Result<T, E>;

/// Errors produced while building a quality report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// A value failed validation.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A remote service answered with a non-success status.
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, decoding).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The narrative summarizer returned something unusable.
    #[error("summarizer error: {0}")]
    Summarizer(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl ReportError {
    /// Shorthand for a [`ReportError::Validation`].
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A [`ReportError::Http`] with `body` cut to a short excerpt.
    #[must_use]
    pub fn http(status: u16, url: impl Into<String>, mut body: String) -> Self {
        if body.len() > HTTP_BODY_LIMIT {
            let mut cut = HTTP_BODY_LIMIT;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Self::Http {
            status,
            url: url.into(),
            body,
        }
    }

    /// Machine-readable classification of this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Config(_) | Self::Yaml(_) => ErrorCode::ConfigError,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::Http { .. } | Self::Transport(_) => ErrorCode::TrackerUnavailable,
            Self::Summarizer(_) => ErrorCode::SummarizerFailed,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::InvalidResponse,
        }
    }
}

/// Stable error classification used for exit codes and JSON error output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ConfigError,
    ValidationFailed,
    TrackerUnavailable,
    SummarizerFailed,
    InvalidResponse,
    IoError,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::TrackerUnavailable => "TRACKER_UNAVAILABLE",
            Self::SummarizerFailed => "SUMMARIZER_FAILED",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::IoError => "IO_ERROR",
        }
    }

    /// Process exit code for this class of failure.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::ConfigError | Self::ValidationFailed => 2,
            Self::TrackerUnavailable | Self::SummarizerFailed => 3,
            Self::InvalidResponse | Self::IoError => 1,
        }
    }
}

/// JSON error payload printed on failure when `--json` is set.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// SCREAMING_SNAKE_CASE classification.
    pub code: &'static str,
    pub message: String,
    pub exit_code: u8,
}

impl From<&ReportError> for ErrorEnvelope {
    fn from(err: &ReportError) -> Self {
        let code = err.code();
        Self {
            error: ErrorBody {
                code: code.as_str(),
                message: err.to_string(),
                exit_code: code.exit_code(),
            },
        }
    }
}
