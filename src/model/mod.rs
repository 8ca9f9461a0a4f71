//! Core data types for `quality_report`.
//!
//! - [`Issue`] - one tracker ticket with its classification cached
//! - [`IssueAttributes`] - the derived type/priority/subsystem bundle
//! - [`Comment`] - a user comment, present only when requested
//! - [`Dimension`] - a classification axis used for counting
//! - [`DateRange`] / [`ReleaseWindow`] - comparison slices

mod field;
mod window;

pub use field::{
    AVAILABLE_IN_FIELD, CustomField, FieldValue, PRIORITY_FIELD, SUBSYSTEM_FIELD, TYPE_FIELD,
    extract,
};
pub use window::{DateRange, ReleaseWindow};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Classification derived from an issue's custom fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IssueAttributes {
    pub issue_type: Option<String>,
    pub priority: Option<String>,
    pub subsystem: Option<String>,
    pub available_in: Option<String>,
}

impl IssueAttributes {
    /// Classify a custom-field list.
    #[must_use]
    pub fn classify(fields: &[CustomField]) -> Self {
        Self {
            issue_type: extract(fields, TYPE_FIELD),
            priority: extract(fields, PRIORITY_FIELD),
            subsystem: extract(fields, SUBSYSTEM_FIELD),
            available_in: extract(fields, AVAILABLE_IN_FIELD),
        }
    }
}

/// A comment left on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    /// Author email, or login when the email is hidden.
    pub author: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One tracker ticket.
///
/// Classification happens once, in [`Issue::new`]; the custom fields and the
/// derived attributes cannot drift apart afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub id: String,
    pub summary: String,
    custom_fields: Vec<CustomField>,
    attributes: IssueAttributes,
    pub comments: Vec<Comment>,
}

impl Issue {
    pub fn new(
        id: impl Into<String>,
        summary: impl Into<String>,
        custom_fields: Vec<CustomField>,
        comments: Vec<Comment>,
    ) -> Self {
        let attributes = IssueAttributes::classify(&custom_fields);
        Self {
            id: id.into(),
            summary: summary.into(),
            custom_fields,
            attributes,
            comments,
        }
    }

    #[must_use]
    pub fn custom_fields(&self) -> &[CustomField] {
        &self.custom_fields
    }

    #[must_use]
    pub const fn attributes(&self) -> &IssueAttributes {
        &self.attributes
    }

    #[must_use]
    pub fn issue_type(&self) -> Option<&str> {
        self.attributes.issue_type.as_deref()
    }

    #[must_use]
    pub fn priority(&self) -> Option<&str> {
        self.attributes.priority.as_deref()
    }

    #[must_use]
    pub fn subsystem(&self) -> Option<&str> {
        self.attributes.subsystem.as_deref()
    }

    #[must_use]
    pub fn available_in(&self) -> Option<&str> {
        self.attributes.available_in.as_deref()
    }

    /// Value of `dimension` for this issue.
    #[must_use]
    pub fn dimension(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Type => self.issue_type(),
            Dimension::Priority => self.priority(),
            Dimension::Subsystem => self.subsystem(),
        }
    }
}

/// Classification axis for counting issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Type,
    Priority,
    Subsystem,
}

impl Dimension {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Priority => "priority",
            Self::Subsystem => "subsystem",
        }
    }

    /// Column header used in tables and chart axes.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Type => "Issue Type",
            Self::Priority => "Priority",
            Self::Subsystem => "Subsystem",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
