// Error types for configuration management

use formguard_validation::ValidatorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Rule set not found: {0}")]
    FormNotFound(String),

    #[error("Unknown message kind: {0}")]
    UnknownMessageKind(String),

    #[error("Invalid rules in form `{form}`: {source}")]
    InvalidRules {
        form: String,
        #[source]
        source: ValidatorError,
    },

    #[error("Invalid value for `{key}`: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
