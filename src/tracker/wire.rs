//! JSON shapes returned by the tracker's `issues` endpoint.
//!
//! Everything optional is decoded leniently; conversion into [`Issue`] decides
//! what a missing or malformed value means.

use crate::model::{Comment, CustomField, FieldValue, Issue};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireIssue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub id_readable: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub custom_fields: Option<Vec<WireField>>,
    #[serde(default)]
    pub comments: Option<Vec<WireComment>>,
}

#[derive(Debug, Deserialize)]
pub struct WireField {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct WireComment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub author: Option<WireUser>,
}

#[derive(Debug, Deserialize)]
pub struct WireUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub login: Option<String>,
}

/// Interpret a raw custom field value.
///
/// Objects contribute their `name`; lists contribute the names of their
/// elements, skipping nameless ones; bare scalars are taken as-is.
#[must_use]
pub fn field_value(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Absent,
        Value::Array(items) => FieldValue::Multiple(items.iter().filter_map(option_name).collect()),
        Value::Object(_) => option_name(value).map_or(FieldValue::Absent, FieldValue::Single),
        Value::String(text) => FieldValue::Single(text.clone()),
        Value::Number(number) => FieldValue::Single(number.to_string()),
        Value::Bool(flag) => FieldValue::Single(flag.to_string()),
    }
}

fn option_name(value: &Value) -> Option<String> {
    value
        .get("name")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

impl From<WireComment> for Comment {
    fn from(wire: WireComment) -> Self {
        let author = wire
            .author
            .and_then(|user| user.email.or(user.login))
            .filter(|author| !author.trim().is_empty());
        Self {
            id: wire.id.unwrap_or_default(),
            text: wire.text.unwrap_or_default(),
            author,
            created_at: wire.created.and_then(DateTime::<Utc>::from_timestamp_millis),
        }
    }
}

impl From<WireIssue> for Issue {
    fn from(wire: WireIssue) -> Self {
        let id = wire.id_readable.or(wire.id).unwrap_or_default();
        let fields = wire
            .custom_fields
            .unwrap_or_default()
            .into_iter()
            .filter_map(|field| {
                let name = field.name?;
                Some(CustomField::new(name, field_value(&field.value)))
            })
            .collect();
        let comments = wire
            .comments
            .unwrap_or_default()
            .into_iter()
            .map(Comment::from)
            .collect();
        Self::new(id, wire.summary.unwrap_or_default(), fields, comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_single_multi_and_null_fields() {
        let payload = json!([{
            "id": "25-1",
            "idReadable": "RSRP-1",
            "summary": "Crash",
            "customFields": [
                {"name": "Priority", "value": {"name": "Major", "$type": "EnumBundleElement"}},
                {"name": "Subsystem", "value": null},
                {
                    "name": "Available in",
                    "value": [{"name": "2024.2.1"}, {"$type": "x"}, {"name": "2024.2.2"}]
                },
                {"value": {"name": "orphan"}}
            ]
        }]);
        let wire: Vec<WireIssue> = serde_json::from_value(payload).unwrap();
        let issue = Issue::from(wire.into_iter().next().unwrap());

        assert_eq!(issue.id, "RSRP-1");
        assert_eq!(issue.priority(), Some("Major"));
        assert_eq!(issue.subsystem(), None);
        assert_eq!(issue.available_in(), Some("2024.2.1, 2024.2.2"));
        assert_eq!(issue.custom_fields().len(), 3);
        assert!(issue.comments.is_empty());
    }

    #[test]
    fn falls_back_to_internal_id() {
        let wire: WireIssue = serde_json::from_value(json!({"id": "25-7"})).unwrap();
        let issue = Issue::from(wire);
        assert_eq!(issue.id, "25-7");
        assert_eq!(issue.summary, "");
    }

    #[test]
    fn null_collections_decode_as_empty() {
        let payload = r#"[
            {"id": "1", "idReadable": "X-1", "summary": null,
             "customFields": null, "comments": null},
            {"idReadable": "X-2", "summary": "ok",
             "customFields": [{"name": "Type", "value": {"name": "Bug"}}]}
        ]"#;
        let wire: Vec<WireIssue> = serde_json::from_str(payload).unwrap();
        let issues: Vec<Issue> = wire.into_iter().map(Issue::from).collect();

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].id, "X-1");
        assert!(issues[0].custom_fields().is_empty());
        assert!(issues[0].comments.is_empty());
        assert_eq!(issues[1].issue_type(), Some("Bug"));
    }

    #[test]
    fn nameless_single_value_is_absent() {
        assert_eq!(field_value(&json!({"$type": "x"})), FieldValue::Absent);
        assert_eq!(field_value(&json!([])), FieldValue::Multiple(vec![]));
        assert_eq!(field_value(&json!(3)), FieldValue::Single("3".to_string()));
    }

    #[test]
    fn decodes_comments() {
        let wire: WireIssue = serde_json::from_value(json!({
            "idReadable": "RSRP-2",
            "summary": "Slow",
            "comments": [
                {
                    "id": "4-1",
                    "text": "Still slow",
                    "created": 1_717_200_000_000_i64,
                    "author": {"email": "user@example.com", "login": "user"}
                },
                {"id": "4-2", "text": "hidden", "author": {"login": "anon"}},
                {"id": "4-3", "text": "ghost", "author": null}
            ]
        }))
        .unwrap();
        let issue = Issue::from(wire);

        assert_eq!(issue.comments.len(), 3);
        assert_eq!(issue.comments[0].author.as_deref(), Some("user@example.com"));
        assert!(issue.comments[0].created_at.is_some());
        assert_eq!(issue.comments[1].author.as_deref(), Some("anon"));
        assert_eq!(issue.comments[1].created_at, None);
        assert_eq!(issue.comments[2].author, None);
    }
}
