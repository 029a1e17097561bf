// Configuration and infrastructure errors

use thiserror::Error;

/// Errors raised while building a [`Validator`](crate::Validator).
///
/// User input never produces one of these; failed rules are recorded in
/// [`ValidationErrors`](crate::ValidationErrors) instead. A `ValidatorError`
/// means the rule declarations are wrong or the record store could not answer.
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Empty rule segment in rules for field `{field}`")]
    EmptySegment { field: String },

    #[error("Unknown rule `{rule}` for field `{field}`")]
    UnknownRule { field: String, rule: String },

    #[error("Rule `{rule}` for field `{field}` requires a parameter")]
    MissingParameter { field: String, rule: String },

    #[error("Rule `{rule}` for field `{field}` does not take a parameter")]
    UnexpectedParameter { field: String, rule: String },

    #[error("Invalid parameter for rule `{rule}` on field `{field}`: {reason}")]
    InvalidParameter {
        field: String,
        rule: String,
        reason: String,
    },

    #[error("Field `{field}` uses `unique` but no record store was configured")]
    MissingRecordStore { field: String },

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors reported by a [`RecordStore`](crate::RecordStore) adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),
}

/// Unknown error kind name, e.g. in a template override.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown error kind: {0}")]
pub struct UnknownErrorKind(pub String);

pub type Result<T> = std::result::Result<T, ValidatorError>;
