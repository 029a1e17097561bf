// Per-field evaluation state

use crate::value::SubmittedData;
use serde_json::Value;

/// State threaded through the rules of one field.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Field under evaluation
    pub field: &'a str,

    /// Submitted value; `None` when the key is absent
    pub value: Option<&'a Value>,

    /// Whether the field's rules contain `nullable`
    pub nullable: bool,

    data: &'a SubmittedData,
}

impl<'a> ValidationContext<'a> {
    pub fn new(field: &'a str, data: &'a SubmittedData, nullable: bool) -> Self {
        Self {
            field,
            value: data.get(field),
            nullable,
            data,
        }
    }

    /// The key is present, even when its value is null
    pub fn exists(&self) -> bool {
        self.value.is_some()
    }

    /// Look up another submitted field
    pub fn other(&self, field: &str) -> Option<&'a Value> {
        self.data.get(field)
    }
}
