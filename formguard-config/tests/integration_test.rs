//! Integration tests for formguard-config

use formguard_config::*;
use formguard_validation::{ErrorKind, MemoryRecordStore, SubmittedData};
use serde_json::json;
use std::env;
use std::fs;
use tempfile::TempDir;

const RULES: &str = r#"
identifier_column = "id"

[logging]
level = "warn"
format = "compact"

[messages]
unique = "{field} is already registered"

[forms.signup]
name = "required|string"
email = "required|unique:users,email,except_id,7"
"#;

fn submitted(value: serde_json::Value) -> SubmittedData {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_load_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.toml");
    fs::write(&path, RULES).unwrap();

    let config = ValidationConfig::load_file(&path).unwrap();

    assert_eq!(config.options().identifier_column, "id");
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert!(config.check_rules().is_ok());
}

#[test]
fn test_load_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.json");
    fs::write(
        &path,
        r#"{"forms": {"contact": {"message": "required", "topic": "in:sales,support"}}}"#,
    )
    .unwrap();

    let config = ValidationConfig::load_file(&path).unwrap();
    assert_eq!(
        config.rules_for("contact").unwrap().get("topic").map(String::as_str),
        Some("in:sales,support")
    );
}

#[test]
fn test_load_env_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.env");
    fs::write(
        &path,
        "forms.login.email=required\nmessages.required=\"{field} please\"\n",
    )
    .unwrap();

    let config = ValidationConfig::load_file(&path).unwrap();
    let validator = config
        .builder("login", &SubmittedData::new())
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(validator.first_error("email"), Some("email please"));
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = ValidationConfig::load_file(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}

#[test]
fn test_load_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.yaml");
    fs::write(&path, "forms: {}").unwrap();

    assert!(matches!(
        ValidationConfig::load_file(&path),
        Err(ConfigError::LoadError(_))
    ));
}

#[test]
fn test_configured_unique_rule() {
    let config = ValidationConfig::parse(RULES, FileFormat::Toml).unwrap();
    let store = MemoryRecordStore::from_json(json!({
        "users": [
            { "id": 7, "email": "me@x.com" },
            { "id": 8, "email": "taken@x.com" }
        ]
    }))
    .unwrap();

    let own = submitted(json!({ "name": "Me", "email": "me@x.com" }));
    let validator = config
        .builder("signup", &own)
        .unwrap()
        .record_store(&store)
        .build()
        .unwrap();
    assert!(validator.passes());

    let taken = submitted(json!({ "name": "Me", "email": "taken@x.com" }));
    let validator = config
        .builder("signup", &taken)
        .unwrap()
        .record_store(&store)
        .build()
        .unwrap();
    assert_eq!(
        validator.first_error("email"),
        Some("email is already registered")
    );
    assert_eq!(validator.errors().get("email").unwrap()[0].kind, ErrorKind::Unique);
}

#[test]
fn test_env_overrides() {
    unsafe {
        env::set_var("FORMGUARD_IDENTIFIER_COLUMN", "uuid");
        env::set_var("FORMGUARD_MESSAGE_TIME", "{field}: use HH:MM");
    }

    let mut config = ValidationConfig::parse(RULES, FileFormat::Toml).unwrap();
    let result = config.apply_env();

    unsafe {
        env::remove_var("FORMGUARD_IDENTIFIER_COLUMN");
        env::remove_var("FORMGUARD_MESSAGE_TIME");
    }

    result.unwrap();
    assert_eq!(config.options().identifier_column, "uuid");
    assert_eq!(
        config.templates().unwrap().get(ErrorKind::Time),
        "{field}: use HH:MM"
    );
}

#[test]
fn test_load_dotenv_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.env");
    fs::write(&path, "FORMGUARD_DOTENV_PROBE=loaded\n").unwrap();

    ValidationConfig::load_dotenv(Some(&path)).unwrap();
    let value = EnvLoader::formguard().load_var("DOTENV_PROBE");

    unsafe {
        env::remove_var("FORMGUARD_DOTENV_PROBE");
    }

    assert_eq!(value.unwrap(), "loaded");
    assert!(ValidationConfig::load_dotenv(Some(&dir.path().join("none.env"))).is_err());
}
