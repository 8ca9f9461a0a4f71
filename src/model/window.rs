//! Date ranges and release windows.

use crate::error::ReportError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const RANGE_SEPARATOR: &str = "..";

/// Inclusive calendar date range, written `YYYY-MM-DD .. YYYY-MM-DD`.
///
/// The textual form is the one the tracker query language accepts, so a range
/// round-trips between config files and queries unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the range is inverted.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::validation(
                "date range",
                format!("start {start} is after end {end}"),
            ));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `instant` falls on any day of the range (UTC).
    #[must_use]
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        let day = instant.date_naive();
        day >= self.start && day <= self.end
    }

    /// First instant of the range.
    #[must_use]
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {RANGE_SEPARATOR} {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

impl FromStr for DateRange {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s.split_once(RANGE_SEPARATOR).ok_or_else(|| {
            ReportError::validation("date range", format!("expected 'start .. end', got '{s}'"))
        })?;
        let parse = |part: &str| {
            NaiveDate::parse_from_str(part.trim(), "%Y-%m-%d").map_err(|e| {
                ReportError::validation("date range", format!("bad date '{}': {e}", part.trim()))
            })
        };
        Self::new(parse(start)?, parse(end)?)
    }
}

impl TryFrom<String> for DateRange {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateRange> for String {
    fn from(range: DateRange) -> Self {
        range.to_string()
    }
}

impl schemars::JsonSchema for DateRange {
    fn schema_name() -> String {
        "DateRange".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(generator)
    }
}

/// A labelled comparison slice, such as one release cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ReleaseWindow {
    pub label: String,
    pub range: DateRange,
}

impl ReleaseWindow {
    pub fn new(label: impl Into<String>, range: DateRange) -> Self {
        Self {
            label: label.into(),
            range,
        }
    }
}
