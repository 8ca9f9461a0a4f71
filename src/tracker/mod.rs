//! Issue tracker access.
//!
//! - [`query`] - query-language composition
//! - [`client`] - the blocking REST client
//! - [`wire`] - response decoding into [`Issue`]
//!
//! Report code depends only on [`IssueSource`], so tests can substitute an
//! in-memory source for the HTTP client.

pub mod client;
pub mod query;
pub mod wire;

pub use client::TrackerClient;
pub use query::{Predicate, QueryBuilder};

use crate::error::Result;
use crate::model::Issue;

const ISSUE_FIELDS: &str = "id,idReadable,summary,customFields(name,value(name))";
const ISSUE_FIELDS_WITH_COMMENTS: &str =
    "id,idReadable,summary,customFields(name,value(name)),comments(id,text,created,author(login,email))";

/// Which fields a fetch asks the tracker to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Fields,
    FieldsWithComments,
}

impl Projection {
    /// The `fields` request parameter.
    #[must_use]
    pub const fn fields(self) -> &'static str {
        match self {
            Self::Fields => ISSUE_FIELDS,
            Self::FieldsWithComments => ISSUE_FIELDS_WITH_COMMENTS,
        }
    }
}

/// Anything that can answer a tracker query with issues.
pub trait IssueSource {
    /// Run `query` once and return every matching issue.
    ///
    /// # Errors
    ///
    /// Returns an error when the source is unreachable or rejects the query.
    fn fetch(&self, query: &str, projection: Projection) -> Result<Vec<Issue>>;
}

impl<F> IssueSource for F
where
    F: Fn(&str, Projection) -> Result<Vec<Issue>>,
{
    fn fetch(&self, query: &str, projection: Projection) -> Result<Vec<Issue>> {
        self(query, projection)
    }
}
