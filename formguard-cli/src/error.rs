//! Error types for the formguard CLI.

use formguard_config::ConfigError;
use formguard_validation::ValidatorError;
use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types. Every variant exits with status 2.
#[derive(Debug)]
pub enum CliError {
    /// IO error (reading payload or fixture files)
    Io(std::io::Error),

    /// Configuration file or environment error
    Config(ConfigError),

    /// Rule declarations or record store failure
    Rules(ValidatorError),

    /// Payload or fixture file is not the expected JSON
    InvalidInput(String),
}

impl CliError {
    pub const EXIT_CODE: u8 = 2;
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Rules(e) => write!(f, "Rule error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<ValidatorError> for CliError {
    fn from(e: ValidatorError) -> Self {
        CliError::Rules(e)
    }
}
