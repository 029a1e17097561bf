// Error kinds and message templates

use crate::error::UnknownErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The kind of failure a rule reports. Each kind owns one message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Required,
    String,
    Number,
    Unique,
    Time,
    Image,
    Min,
    Max,
    In,
}

impl ErrorKind {
    /// Every kind, in template-table order.
    pub const ALL: [ErrorKind; 9] = [
        ErrorKind::Required,
        ErrorKind::String,
        ErrorKind::Number,
        ErrorKind::Unique,
        ErrorKind::Time,
        ErrorKind::Image,
        ErrorKind::Min,
        ErrorKind::Max,
        ErrorKind::In,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Required => "required",
            ErrorKind::String => "string",
            ErrorKind::Number => "number",
            ErrorKind::Unique => "unique",
            ErrorKind::Time => "time",
            ErrorKind::Image => "image",
            ErrorKind::Min => "min",
            ErrorKind::Max => "max",
            ErrorKind::In => "in",
        }
    }

    /// Built-in template text for this kind.
    pub fn default_template(&self) -> &'static str {
        match self {
            ErrorKind::Required => "The {field} is required",
            ErrorKind::String => "The {field} must be a string",
            ErrorKind::Number => "The {field} must be a number",
            ErrorKind::Unique => "The {field} has already been taken",
            ErrorKind::Time => "The {field} must be a valid time format",
            ErrorKind::Image => {
                "The {field} must be a valid image file (jpg, jpeg, png, gif, webp)"
            }
            ErrorKind::Min => "The {field} must be at least {value} KB in size",
            ErrorKind::Max => "The {field} must not exceed {value} KB in size",
            ErrorKind::In => "The {field} must be one of the following: {value}",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = UnknownErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownErrorKind(s.to_string()))
    }
}

/// Template table used to render failures into messages.
///
/// Starts from the built-in text of every [`ErrorKind`]; individual kinds can
/// be overridden. Placeholders are `{field}` plus whatever the rule supplies
/// (currently `{value}`), substituted literally.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageTemplates {
    templates: HashMap<ErrorKind, String>,
}

impl MessageTemplates {
    /// Create the built-in template table
    pub fn new() -> Self {
        let templates = ErrorKind::ALL
            .iter()
            .map(|kind| (*kind, kind.default_template().to_string()))
            .collect();
        Self { templates }
    }

    /// Override the template for one kind
    pub fn with_template(mut self, kind: ErrorKind, template: impl Into<String>) -> Self {
        self.set(kind, template);
        self
    }

    pub fn set(&mut self, kind: ErrorKind, template: impl Into<String>) {
        self.templates.insert(kind, template.into());
    }

    /// Get the template text for a kind
    pub fn get(&self, kind: ErrorKind) -> &str {
        self.templates
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_template())
    }

    /// Render a message for `field`, replacing `{field}` and each `{name}`.
    pub fn render(&self, kind: ErrorKind, field: &str, replacements: &[(&str, &str)]) -> String {
        let mut message = self.get(kind).replace("{field}", field);

        for (name, value) in replacements {
            let placeholder = format!("{{{}}}", name);
            message = message.replace(&placeholder, value);
        }

        message
    }
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_field_placeholder() {
        let templates = MessageTemplates::new();
        assert_eq!(
            templates.render(ErrorKind::Required, "email", &[]),
            "The email is required"
        );
    }

    #[test]
    fn test_render_value_placeholder() {
        let templates = MessageTemplates::new();
        let message = templates.render(ErrorKind::In, "color", &[("value", "red, green")]);
        assert_eq!(
            message,
            "The color must be one of the following: red, green"
        );
    }

    #[test]
    fn test_override_template() {
        let templates =
            MessageTemplates::new().with_template(ErrorKind::Required, "{field} is missing!");
        assert_eq!(
            templates.render(ErrorKind::Required, "name", &[]),
            "name is missing!"
        );
        // Others keep their defaults
        assert_eq!(
            templates.get(ErrorKind::Number),
            ErrorKind::Number.default_template()
        );
    }

    #[test]
    fn test_unused_replacement_is_ignored() {
        let templates = MessageTemplates::new();
        let message = templates.render(ErrorKind::Time, "start", &[("value", "ignored")]);
        assert_eq!(message, "The start must be a valid time format");
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("required".parse::<ErrorKind>(), Ok(ErrorKind::Required));
        assert_eq!("IN".parse::<ErrorKind>(), Ok(ErrorKind::In));
        assert_eq!(
            "nullable".parse::<ErrorKind>(),
            Err(UnknownErrorKind("nullable".to_string()))
        );
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&ErrorKind::In).unwrap();
        assert_eq!(json, "\"in\"");
        let kind: ErrorKind = serde_json::from_str("\"string\"").unwrap();
        assert_eq!(kind, ErrorKind::String);
    }
}
