// Submitted values and upload records

use indexmap::IndexMap;
use serde_json::Value;
use std::borrow::Cow;

/// Field name to submitted value
pub type SubmittedData = IndexMap<String, Value>;

/// Field name to rule string, e.g. `"required|string"`
pub type RuleSpec = IndexMap<String, String>;

/// Upload error code meaning no file was sent
pub const UPLOAD_ERR_NO_FILE: i64 = 4;

/// Text form of a scalar.
///
/// Strings are returned as-is, numbers in their JSON rendering and booleans as
/// `"1"` / `""`. Null, arrays and objects have no text form.
pub fn text_of(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("1")),
        Value::Bool(false) => Some(Cow::Borrowed("")),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Absent, null or the empty string. Used by the `nullable` short-circuit.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Missing for `required`: blank or `false`. `0`, `"0"` and empty
/// collections count as provided.
pub fn is_missing(value: Option<&Value>) -> bool {
    is_blank(value) || matches!(value, Some(Value::Bool(false)))
}

/// Empty for `required_if`: blank, `"0"`, zero, `false` or an empty
/// array/object.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty() || s == "0",
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Bool(b)) => !b,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}

/// Typed view of a `{name, type, tmp_name, error, size}` upload record.
///
/// Missing keys read as empty strings / `None`. `error` and `size` accept
/// numbers or numeric strings.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub tmp_name: String,
    pub error: Option<i64>,
    pub size: Option<f64>,
}

impl UploadedFile {
    /// View `value` as an upload record. Only JSON objects qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_object()?;

        let text = |key: &str| {
            record
                .get(key)
                .and_then(text_of)
                .map(Cow::into_owned)
                .unwrap_or_default()
        };
        let number = |key: &str| match record.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|n| n.is_finite());

        Some(Self {
            name: text("name"),
            mime_type: text("type"),
            tmp_name: text("tmp_name"),
            error: number("error").map(|code| code as i64),
            size: number("size"),
        })
    }

    /// True when the record stands for "no file was chosen"
    pub fn is_empty_upload(&self) -> bool {
        self.name.is_empty()
            && self.mime_type.is_empty()
            && self.tmp_name.is_empty()
            && self.error == Some(UPLOAD_ERR_NO_FILE)
            && self.size.unwrap_or(0.0) == 0.0
    }

    /// Lowercased extension of the client file name, empty if none
    pub fn extension(&self) -> String {
        let base = self
            .name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.name.as_str());

        base.rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }

    /// Size in kilobytes (1 KB = 1024 bytes)
    pub fn size_kb(&self) -> Option<f64> {
        self.size.map(|bytes| bytes / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_of() {
        assert_eq!(text_of(&json!("abc")).as_deref(), Some("abc"));
        assert_eq!(text_of(&json!(42)).as_deref(), Some("42"));
        assert_eq!(text_of(&json!(2.5)).as_deref(), Some("2.5"));
        assert_eq!(text_of(&json!(true)).as_deref(), Some("1"));
        assert_eq!(text_of(&json!(false)).as_deref(), Some(""));
        assert!(text_of(&Value::Null).is_none());
        assert!(text_of(&json!([1])).is_none());
        assert!(text_of(&json!({})).is_none());
    }

    #[test]
    fn test_blank_missing_and_empty() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&Value::Null)));
        assert!(is_blank(Some(&json!(""))));
        assert!(!is_blank(Some(&json!(0))));
        assert!(!is_blank(Some(&json!(false))));

        assert!(is_missing(Some(&json!(false))));
        assert!(!is_missing(Some(&json!("0"))));
        assert!(!is_missing(Some(&json!([]))));

        assert!(is_empty_value(Some(&json!("0"))));
        assert!(is_empty_value(Some(&json!(0))));
        assert!(is_empty_value(Some(&json!(0.0))));
        assert!(is_empty_value(Some(&json!([]))));
        assert!(is_empty_value(Some(&json!({}))));
        assert!(!is_empty_value(Some(&json!(" "))));
        assert!(!is_empty_value(Some(&json!("00"))));
    }

    #[test]
    fn test_upload_from_value() {
        let file = UploadedFile::from_value(&json!({
            "name": "photos/Cat.JPG",
            "type": "image/jpeg",
            "tmp_name": "/tmp/php123",
            "error": 0,
            "size": "2048"
        }))
        .unwrap();

        assert_eq!(file.extension(), "jpg");
        assert_eq!(file.size_kb(), Some(2.0));
        assert!(!file.is_empty_upload());
        assert!(UploadedFile::from_value(&json!("cat.jpg")).is_none());
    }

    #[test]
    fn test_non_finite_size_is_ignored() {
        for size in ["NaN", "inf", "-infinity"] {
            let file = UploadedFile::from_value(&json!({ "name": "a.png", "size": size })).unwrap();
            assert_eq!(file.size, None, "{}", size);
        }
    }

    #[test]
    fn test_empty_upload() {
        let file = UploadedFile::from_value(&json!({
            "name": "", "type": "", "tmp_name": "", "error": 4, "size": 0
        }))
        .unwrap();
        assert!(file.is_empty_upload());
    }

    #[test]
    fn test_extension_edge_cases() {
        let named = |name: &str| UploadedFile::from_value(&json!({ "name": name })).unwrap();
        assert_eq!(named("archive.tar.GZ").extension(), "gz");
        assert_eq!(named("README").extension(), "");
        assert_eq!(named(".png").extension(), "png");
        assert_eq!(named("dir.v2/file").extension(), "");
        assert_eq!(named("C:\\pics\\me.webp").extension(), "webp");
    }
}
