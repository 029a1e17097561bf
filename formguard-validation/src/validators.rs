// Built-in predicates

use crate::value::{UploadedFile, text_of};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static LETTERS_AND_SPACES_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z ]+$").unwrap());

static NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").unwrap());

static TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(2[0-3]|[01]?[0-9]):([0-5][0-9])$").unwrap());

/// Extensions accepted by the `image` rule
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

// Scalar predicates

/// Letters and spaces only. Null and values whose text form is empty
/// (`""`, `false`) pass.
pub struct IsText;

impl IsText {
    pub fn check(value: &Value) -> bool {
        match value {
            Value::Null => true,
            _ => text_of(value)
                .is_some_and(|text| text.is_empty() || LETTERS_AND_SPACES_REGEX.is_match(&text)),
        }
    }
}

/// JSON numbers, or strings holding an integer or decimal. Surrounding
/// whitespace is not accepted.
pub struct IsNumber;

impl IsNumber {
    pub fn check(value: &Value) -> bool {
        match value {
            Value::Number(_) => true,
            Value::String(s) => NUMBER_REGEX.is_match(s),
            _ => false,
        }
    }
}

/// 24-hour `H:MM` / `HH:MM`
pub struct IsTime;

impl IsTime {
    pub fn check(value: &Value) -> bool {
        text_of(value).is_some_and(|text| TIME_REGEX.is_match(&text))
    }
}

/// Text form is exactly one of the allowed entries
pub struct OneOf<'a>(pub &'a [String]);

impl OneOf<'_> {
    pub fn check(&self, value: &Value) -> bool {
        text_of(value).is_some_and(|text| self.0.iter().any(|allowed| *allowed == *text))
    }
}

// Upload predicates

/// Image extension check; an empty upload passes
pub struct IsImage;

impl IsImage {
    pub fn check(file: &UploadedFile) -> bool {
        if file.is_empty_upload() {
            return true;
        }
        let extension = file.extension();
        IMAGE_EXTENSIONS.contains(&extension.as_str())
    }
}

/// Size at least `self.0` KB; records without a size pass
pub struct MinSize(pub f64);

impl MinSize {
    pub fn check(&self, file: &UploadedFile) -> bool {
        file.size_kb().is_none_or(|kb| kb >= self.0)
    }
}

/// Size at most `self.0` KB; records without a size pass
pub struct MaxSize(pub f64);

impl MaxSize {
    pub fn check(&self, file: &UploadedFile) -> bool {
        file.size_kb().is_none_or(|kb| kb <= self.0)
    }
}
