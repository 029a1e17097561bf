// formguard - declarative validation of submitted form data
//
// Field rules are written as pipe-delimited strings (`"required|string"`,
// `"nullable|image|max:2048"`, `"unique:users,email,except_id,7"`). This crate
// re-exports the validation core and, with the `config` feature, the loader
// for named rule sets.

// Re-export core functionality
pub use formguard_validation::*;

#[cfg(feature = "config")]
pub use formguard_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ErrorKind, MessageTemplates, RecordQuery, RecordStore, RuleSpec, StoreError,
        SubmittedData, ValidationError, ValidationErrors, Validator, ValidatorError,
        ValidatorOptions,
    };

    #[cfg(feature = "config")]
    pub use formguard_config::{ConfigError, FileFormat, LogConfig, ValidationConfig};
}
