//! Tracker query composition.
//!
//! Builds query-language strings such as
//! `project:ReSharper and created: 2024-04-10 .. 2024-08-14 and (created by: -jetbrains-team or created by: dotnet-support)`.

use crate::model::DateRange;
use std::fmt;

/// Author/state predicate appended to a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `created by: <login>`
    Author(String),
    /// `created by: -<login>`
    NotAuthor(String),
    /// `state: <state>`
    State(String),
    /// `#<tag>`, e.g. `#resolved`
    Tag(String),
    /// Verbatim query text, usually from configuration.
    Raw(String),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Whether this predicate needs parentheses when combined with others.
    fn is_compound(&self) -> bool {
        match self {
            Self::All(parts) | Self::Any(parts) => parts.len() > 1,
            Self::Raw(text) => text.contains(" and ") || text.contains(" or "),
            _ => false,
        }
    }

    fn write_part(part: &Self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if part.is_compound() {
            write!(f, "({part})")
        } else {
            write!(f, "{part}")
        }
    }

    fn write_joined(parts: &[Self], separator: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                f.write_str(separator)?;
            }
            Self::write_part(part, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Author(login) => write!(f, "created by: {login}"),
            Self::NotAuthor(login) => write!(f, "created by: -{login}"),
            Self::State(state) => write!(f, "state: {state}"),
            Self::Tag(tag) => write!(f, "#{}", tag.trim_start_matches('#')),
            Self::Raw(text) => f.write_str(text.trim()),
            Self::All(parts) => Self::write_joined(parts, " and ", f),
            Self::Any(parts) => Self::write_joined(parts, " or ", f),
        }
    }
}

/// Composes a project-scoped query.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    terms: Vec<String>,
}

impl QueryBuilder {
    pub fn new(project: &str) -> Self {
        Self {
            terms: vec![format!("project:{project}")],
        }
    }

    /// Issues created inside `range`.
    #[must_use]
    pub fn created(mut self, range: &DateRange) -> Self {
        self.terms.push(format!("created: {range}"));
        self
    }

    /// Issues commented inside `range`.
    #[must_use]
    pub fn commented(mut self, range: &DateRange) -> Self {
        self.terms.push(format!("(commented: {range})"));
        self
    }

    /// Issues whose `Available in` field matches `pattern`, e.g. `2024.2.*`.
    #[must_use]
    pub fn available_in(mut self, pattern: &str) -> Self {
        self.terms.push(format!("Available in: {pattern}"));
        self
    }

    /// Append a predicate; compound and raw predicates are parenthesized.
    #[must_use]
    pub fn predicate(mut self, predicate: &Predicate) -> Self {
        let rendered = predicate.to_string();
        if rendered.is_empty() {
            return self;
        }
        if predicate.is_compound() || matches!(predicate, Predicate::Raw(_)) {
            self.terms.push(format!("({rendered})"));
        } else {
            self.terms.push(rendered);
        }
        self
    }

    /// Append an optional raw predicate, skipping blank text.
    #[must_use]
    pub fn raw(self, text: Option<&str>) -> Self {
        match text.map(str::trim) {
            Some(text) if !text.is_empty() => self.predicate(&Predicate::Raw(text.to_string())),
            _ => self,
        }
    }

    #[must_use]
    pub fn build(&self) -> String {
        self.terms.join(" and ")
    }
}
