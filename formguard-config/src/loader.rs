// Configuration file loaders

use crate::{ConfigError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Detect the format of a path, treating a bare `.env` file as `Env`
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) => Self::from_extension(ext),
            None => match path.file_name().and_then(|s| s.to_str()) {
                Some(".env") => Some(FileFormat::Env),
                _ => None,
            },
        }
    }
}

/// Configuration file loader
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path).ok_or_else(|| {
            ConfigError::LoadError(format!("Unsupported format: {}", path.display()))
        })?;

        Ok(Self::new(format))
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        self.parse(&content)
    }

    /// Parse configuration from string
    pub fn parse(&self, content: &str) -> Result<Value> {
        match self.format {
            FileFormat::Json => self.parse_json(content),
            FileFormat::Toml => self.parse_toml(content),
            FileFormat::Env => self.parse_env(content),
        }
    }

    fn parse_json(&self, content: &str) -> Result<Value> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))
    }

    fn parse_toml(&self, content: &str) -> Result<Value> {
        let toml_value: toml::Value = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        serde_json::to_value(toml_value)
            .map_err(|e| ConfigError::ParseError(format!("TOML to JSON conversion error: {}", e)))
    }

    /// `KEY=value` lines; dotted keys (`forms.signup.email`) become nested tables
    fn parse_env(&self, content: &str) -> Result<Value> {
        let mut root = Map::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::ParseError(format!(
                    "Expected KEY=value, found `{}`",
                    line
                )));
            };

            let value = unquote(value.trim());
            insert_dotted(&mut root, key.trim(), Value::String(value.to_string()))?;
        }

        Ok(Value::Object(root))
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn insert_dotted(root: &mut Map<String, Value>, key: &str, value: Value) -> Result<()> {
    let mut segments = key.split('.').peekable();
    let mut table = root;

    while let Some(segment) = segments.next() {
        if segment.is_empty() {
            return Err(ConfigError::ParseError(format!("Invalid key `{}`", key)));
        }

        if segments.peek().is_none() {
            table.insert(segment.to_string(), value);
            return Ok(());
        }

        let entry = table
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        table = entry.as_object_mut().ok_or_else(|| {
            ConfigError::ParseError(format!("Key `{}` is both a value and a table", key))
        })?;
    }

    Err(ConfigError::ParseError(format!("Invalid key `{}`", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let json = r#"{"forms": {"login": {"email": "required"}}}"#;

        let result = loader.parse(json).unwrap();
        assert_eq!(result["forms"]["login"]["email"], "required");
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let toml = r#"
            identifier_column = "id"

            [forms.signup]
            name = "required|string"
            email = "required|unique:users,email"
        "#;

        let result = loader.parse(toml).unwrap();
        assert_eq!(result["identifier_column"], "id");
        assert_eq!(result["forms"]["signup"]["email"], "required|unique:users,email");
    }

    #[test]
    fn test_parse_toml_keeps_field_order() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let result = loader
            .parse("[forms.f]\nzeta = \"required\"\nalpha = \"string\"\n")
            .unwrap();

        let keys: Vec<_> = result["forms"]["f"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_parse_env() {
        let loader = ConfigLoader::new(FileFormat::Env);
        let env = r#"
            # Comment
            identifier_column=id
            forms.signup.email="required|unique:users,email"
            messages.required='{field} is missing'
        "#;

        let result = loader.parse(env).unwrap();
        assert_eq!(
            result,
            json!({
                "identifier_column": "id",
                "forms": { "signup": { "email": "required|unique:users,email" } },
                "messages": { "required": "{field} is missing" }
            })
        );
    }

    #[test]
    fn test_parse_env_rejects_conflicting_keys() {
        let loader = ConfigLoader::new(FileFormat::Env);
        assert!(loader.parse("forms=x\nforms.a.b=required").is_err());
        assert!(loader.parse("forms..b=required").is_err());
        assert!(loader.parse("not a pair").is_err());
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("env"), Some(FileFormat::Env));
        assert_eq!(FileFormat::from_extension("unknown"), None);
        assert_eq!(FileFormat::from_path(Path::new(".env")), Some(FileFormat::Env));
        assert!(ConfigLoader::auto("rules").is_err());
    }
}
