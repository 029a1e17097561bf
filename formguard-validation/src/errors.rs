// Validation errors

use crate::ErrorKind;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A single failed rule on a field
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Field name that failed validation
    pub field: String,

    /// Which rule family failed
    pub kind: ErrorKind,

    /// Rendered message
    pub message: String,

    /// Substituted `{value}`, if the rule supplied one
    pub value: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
            value: None,
        }
    }

    /// Set the substituted value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Errors of one validation run, grouped per field.
///
/// Fields appear in the order their first failure was recorded; each field's
/// errors keep rule evaluation order. Fields without failures are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    fields: IndexMap<String, Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of errors across all fields
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Number of fields with at least one error
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Add an error
    pub fn add(&mut self, error: ValidationError) {
        self.fields
            .entry(error.field.clone())
            .or_default()
            .push(error);
    }

    /// Check whether a field has errors
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Option<&[ValidationError]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Rendered messages for a field, empty if it passed
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.get(field)
            .map(|errors| errors.iter().map(|e| e.message.as_str()).collect())
            .unwrap_or_default()
    }

    /// First message recorded for a field
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(|errors| errors.first())
            .map(|e| e.message.as_str())
    }

    /// Field names with errors
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate every error in recording order
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.fields.values().flatten()
    }

    /// Field to rendered messages
    pub fn messages(&self) -> IndexMap<String, Vec<String>> {
        self.fields
            .iter()
            .map(|(field, errors)| {
                (
                    field.clone(),
                    errors.iter().map(|e| e.message.clone()).collect(),
                )
            })
            .collect()
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.messages(),
        })
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, errors) in &self.fields {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            map.serialize_entry(field, &messages)?;
        }
        map.end()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in self.iter() {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        let mut collected = Self::new();
        for error in errors {
            collected.add(error);
        }
        collected
    }
}
