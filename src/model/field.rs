//! Custom field values and extraction.
//!
//! Tracker schemas allow both single- and multi-select custom fields, so a
//! field value is one of three shapes. Extraction never fails: absence is the
//! uniform "not found" signal.

use serde::Serialize;

/// Field name carrying the issue type.
pub const TYPE_FIELD: &str = "Type";
/// Field name carrying the issue priority.
pub const PRIORITY_FIELD: &str = "Priority";
/// Field name carrying the product subsystem.
pub const SUBSYSTEM_FIELD: &str = "Subsystem";
/// Field name carrying the releases a fix shipped in.
pub const AVAILABLE_IN_FIELD: &str = "Available in";

/// Value of a single custom field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    #[default]
    Absent,
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    /// Display rendering of the value, or `None` when there is nothing to show.
    #[must_use]
    pub fn display(&self) -> Option<String> {
        match self {
            Self::Absent => None,
            Self::Single(name) => Some(name.clone()),
            Self::Multiple(names) if names.is_empty() => None,
            Self::Multiple(names) => Some(names.join(", ")),
        }
    }
}

/// A named custom field attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomField {
    pub name: String,
    pub value: FieldValue,
}

impl CustomField {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Extract the display value of the first field named `target`.
///
/// Later entries with the same name are ignored.
#[must_use]
pub fn extract(fields: &[CustomField], target: &str) -> Option<String> {
    fields
        .iter()
        .find(|field| field.name == target)
        .and_then(|field| field.value.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(name: &str, value: &str) -> CustomField {
        CustomField::new(name, FieldValue::Single(value.to_string()))
    }

    #[test]
    fn extracts_single_option() {
        let fields = vec![single("Type", "Bug"), single("Priority", "Major")];
        assert_eq!(extract(&fields, PRIORITY_FIELD).as_deref(), Some("Major"));
    }

    #[test]
    fn joins_multiple_options() {
        let fields = vec![CustomField::new(
            AVAILABLE_IN_FIELD,
            FieldValue::Multiple(vec!["2024.2.1".to_string(), "2024.2.2".to_string()]),
        )];
        assert_eq!(
            extract(&fields, AVAILABLE_IN_FIELD).as_deref(),
            Some("2024.2.1, 2024.2.2")
        );
    }

    #[test]
    fn empty_list_is_absent() {
        let fields = vec![CustomField::new("Available in", FieldValue::Multiple(vec![]))];
        assert_eq!(extract(&fields, AVAILABLE_IN_FIELD), None);
    }

    #[test]
    fn absent_and_missing_are_none() {
        let fields = vec![CustomField::new("Subsystem", FieldValue::Absent)];
        assert_eq!(extract(&fields, SUBSYSTEM_FIELD), None);
        assert_eq!(extract(&fields, TYPE_FIELD), None);
        assert_eq!(extract(&[], TYPE_FIELD), None);
    }

    #[test]
    fn first_matching_entry_wins() {
        let fields = vec![
            CustomField::new("Type", FieldValue::Absent),
            single("Type", "Bug"),
        ];
        assert_eq!(extract(&fields, TYPE_FIELD), None);

        let fields = vec![single("Type", "Task"), single("Type", "Bug")];
        assert_eq!(extract(&fields, TYPE_FIELD).as_deref(), Some("Task"));
    }

    #[test]
    fn field_names_are_case_sensitive() {
        let fields = vec![single("type", "Bug")];
        assert_eq!(extract(&fields, TYPE_FIELD), None);
    }
}
