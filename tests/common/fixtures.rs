use chrono::{DateTime, TimeZone, Utc};
use quality_report::model::{Comment, CustomField, FieldValue, Issue};

/// Builder for test issues.
pub struct IssueBuilder {
    id: String,
    summary: String,
    fields: Vec<CustomField>,
    comments: Vec<Comment>,
}

impl IssueBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            summary: format!("Summary of {id}"),
            fields: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.fields
            .push(CustomField::new(name, FieldValue::Single(value.to_string())));
        self
    }

    pub fn issue_type(self, value: &str) -> Self {
        self.field("Type", value)
    }

    pub fn priority(self, value: &str) -> Self {
        self.field("Priority", value)
    }

    pub fn subsystem(self, value: &str) -> Self {
        self.field("Subsystem", value)
    }

    pub fn available_in(mut self, versions: &[&str]) -> Self {
        self.fields.push(CustomField::new(
            "Available in",
            FieldValue::Multiple(versions.iter().map(ToString::to_string).collect()),
        ));
        self
    }

    pub fn comment(mut self, text: &str, author: &str, at: DateTime<Utc>) -> Self {
        self.comments.push(Comment {
            id: format!("{}-c{}", self.id, self.comments.len()),
            text: text.to_string(),
            author: Some(author.to_string()),
            created_at: Some(at),
        });
        self
    }

    pub fn build(self) -> Issue {
        Issue::new(self.id, self.summary, self.fields, self.comments)
    }
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

/// `[{Bug, Major}, {Bug, Major}, {Feature, Minor}]`
pub fn three_issues() -> Vec<Issue> {
    vec![
        IssueBuilder::new("RSRP-1").issue_type("Bug").priority("Major").build(),
        IssueBuilder::new("RSRP-2").issue_type("Bug").priority("Major").build(),
        IssueBuilder::new("RSRP-3").issue_type("Feature").priority("Minor").build(),
    ]
}
