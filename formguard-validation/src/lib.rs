//! Rule-string validation for submitted form data
//!
//! A [`Validator`] takes a map of submitted values and a map of field names to
//! pipe-delimited rule strings (`"required|string"`, `"nullable|image|max:2048"`),
//! evaluates every declared field, and exposes the per-field error messages
//! together with the allow-listed subset of the submitted data.
//!
//! # Examples
//!
//! ## Basic Validation
//!
//! ```
//! use formguard_validation::{RuleSpec, SubmittedData, Validator};
//! use serde_json::json;
//!
//! let mut data = SubmittedData::new();
//! data.insert("name".to_string(), json!("John"));
//! data.insert("starts_at".to_string(), json!("24:00"));
//!
//! let mut rules = RuleSpec::new();
//! rules.insert("name".to_string(), "required|string".to_string());
//! rules.insert("starts_at".to_string(), "required|time".to_string());
//! rules.insert("nickname".to_string(), "nullable|string".to_string());
//!
//! let validator = Validator::new(&data, &rules).unwrap();
//! assert_eq!(
//!     validator.errors().messages_for("starts_at"),
//!     vec!["The starts_at must be a valid time format"]
//! );
//! assert!(!validator.errors().has("nickname"));
//! ```
//!
//! ## Uniqueness Checks
//!
//! `unique:table,column[,except_id,<id>]` asks a [`RecordStore`] how many
//! records already hold the value. The store is injected, and may be opened
//! lazily so runs without a `unique` rule never connect.
//!
//! ```
//! use formguard_validation::{MemoryRecordStore, RuleSpec, SubmittedData, Validator};
//! use serde_json::json;
//!
//! let store = MemoryRecordStore::from_json(json!({
//!     "users": [{ "record_id": 1, "email": "a@x.com" }]
//! }))
//! .unwrap();
//!
//! let mut data = SubmittedData::new();
//! data.insert("email".to_string(), json!("a@x.com"));
//!
//! let mut rules = RuleSpec::new();
//! rules.insert("email".to_string(), "required|unique:users,email".to_string());
//!
//! let validator = Validator::builder(&data, &rules)
//!     .connector(|| Ok(store))
//!     .build()
//!     .unwrap();
//! assert_eq!(
//!     validator.first_error("email"),
//!     Some("The email has already been taken")
//! );
//! ```
//!
//! ## Configuration Errors
//!
//! Malformed rule strings are programming errors and fail the whole run:
//!
//! ```
//! use formguard_validation::{RuleSpec, SubmittedData, Validator, ValidatorError};
//!
//! let mut rules = RuleSpec::new();
//! rules.insert("name".to_string(), "required|".to_string());
//!
//! let result = Validator::new(&SubmittedData::new(), &rules);
//! assert!(matches!(result, Err(ValidatorError::EmptySegment { .. })));
//! ```

mod context;
mod error;
mod errors;
mod messages;
mod parser;
mod rules;
mod sql;
mod store;
mod validator;
mod validators;
mod value;

pub use context::*;
pub use error::*;
pub use errors::*;
pub use messages::*;
pub use parser::*;
pub use rules::*;
pub use sql::*;
pub use store::*;
pub use validator::*;
pub use validators::*;
pub use value::*;
