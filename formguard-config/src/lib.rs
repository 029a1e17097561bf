// Configuration management for formguard
//
// Named rule sets, message template overrides, the identifier column used by
// `unique`, and logging settings, loaded from JSON, TOML or `.env` files and
// overridable through `FORMGUARD_*` environment variables.

pub mod env;
pub mod error;
pub mod loader;
pub mod logging;
pub mod settings;

pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use settings::ValidationConfig;
