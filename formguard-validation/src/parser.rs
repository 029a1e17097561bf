// Rule string parsing

use crate::error::{Result, ValidatorError};

/// One `name` or `name:parameter` segment of a rule string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule {
    pub name: String,
    pub parameter: Option<String>,
}

impl ParsedRule {
    pub fn new(name: impl Into<String>, parameter: Option<String>) -> Self {
        Self {
            name: name.into(),
            parameter,
        }
    }
}

/// Split a rule string such as `"required|min:10|in:a,b"` into its segments.
///
/// Segments are separated by `|`; the first `:` in a segment separates the
/// rule name from its parameter, so parameters may contain `:` and `,` but
/// never `|`. There is no escaping. Segments are not trimmed, and an empty
/// segment (`""`, `"required|"`, `"a||b"`) is rejected.
pub fn parse_rules(field: &str, rules: &str) -> Result<Vec<ParsedRule>> {
    rules
        .split('|')
        .map(|segment| {
            if segment.is_empty() {
                return Err(ValidatorError::EmptySegment {
                    field: field.to_string(),
                });
            }

            Ok(match segment.split_once(':') {
                Some((name, parameter)) => ParsedRule::new(name, Some(parameter.to_string())),
                None => ParsedRule::new(segment, None),
            })
        })
        .collect()
}
