//! Validate command
//!
//! Runs a JSON payload through a named rule set and prints the outcome as
//! JSON on STDOUT.

use crate::error::{CliError, CliResult};
use formguard_config::ValidationConfig;
use formguard_validation::{MemoryRecordStore, StoreError, SubmittedData, Validator};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Whether the payload satisfied the rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    Invalid,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Valid => 0,
            Outcome::Invalid => 1,
        }
    }
}

/// Validate `data` against `form`.
///
/// The records file, if any, is only read when a `unique` rule is evaluated.
pub fn execute(
    config: &ValidationConfig,
    form: &str,
    data: &Path,
    records: Option<&Path>,
    pretty: bool,
) -> CliResult<Outcome> {
    let submitted = read_payload(data)?;

    let mut builder = config.builder(form, &submitted)?;
    if let Some(path) = records {
        let path = path.to_path_buf();
        builder = builder.connector(move || load_records(path));
    }

    let validator = builder.build()?;
    let outcome = if validator.passes() {
        Outcome::Valid
    } else {
        Outcome::Invalid
    };

    info!(
        form = form,
        valid = validator.passes(),
        failed_fields = validator.errors().field_count(),
        "Validated payload"
    );

    println!("{}", render_report(validator, pretty)?);
    Ok(outcome)
}

fn read_payload(path: &Path) -> CliResult<SubmittedData> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| CliError::InvalidInput(format!("{}: {}", path.display(), e)))?;

    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(CliError::InvalidInput(format!(
            "{}: expected a JSON object, found {}",
            path.display(),
            type_name(&other)
        ))),
    }
}

fn load_records(path: PathBuf) -> Result<MemoryRecordStore, StoreError> {
    debug!(path = %path.display(), "Loading record fixtures");

    let content = fs::read_to_string(&path)
        .map_err(|e| StoreError::Connection(format!("{}: {}", path.display(), e)))?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| StoreError::Connection(format!("{}: {}", path.display(), e)))?;

    MemoryRecordStore::from_json(value)
}

fn render_report(validator: Validator, pretty: bool) -> CliResult<String> {
    let valid = validator.passes();
    let (validated, errors) = validator.into_parts();

    let mut report = Map::new();
    report.insert("valid".to_string(), Value::Bool(valid));
    report.insert(
        "errors".to_string(),
        serde_json::to_value(&errors).map_err(|e| CliError::InvalidInput(e.to_string()))?,
    );
    report.insert(
        "validated".to_string(),
        Value::Object(validated.into_iter().collect()),
    );

    let report = Value::Object(report);
    let rendered = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    rendered.map_err(|e| CliError::InvalidInput(e.to_string()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
