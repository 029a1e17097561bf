// Validator: runs a rule spec over submitted data

use crate::context::ValidationContext;
use crate::error::{Result, StoreError};
use crate::errors::{ValidationError, ValidationErrors};
use crate::messages::MessageTemplates;
use crate::parser::parse_rules;
use crate::rules::{Failure, RecordAccess, Rule};
use crate::store::{LazyRecordStore, RecordStore};
use crate::value::{RuleSpec, SubmittedData, is_blank};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Column compared against the `except_id` value of `unique`
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "record_id";

/// Settings that are not part of the rule strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// Identifier column excluded by `unique:...,except_id,<value>`
    pub identifier_column: String,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            identifier_column: DEFAULT_IDENTIFIER_COLUMN.to_string(),
        }
    }
}

/// Result of validating one set of submitted data.
///
/// Validation runs to completion while the validator is built; afterwards it
/// only exposes the outcome.
///
/// ```
/// use formguard_validation::{RuleSpec, SubmittedData, Validator};
/// use serde_json::json;
///
/// let mut data = SubmittedData::new();
/// data.insert("name".to_string(), json!("Ada Lovelace"));
/// data.insert("age".to_string(), json!("thirty"));
/// data.insert("admin".to_string(), json!(true));
///
/// let mut rules = RuleSpec::new();
/// rules.insert("name".to_string(), "required|string".to_string());
/// rules.insert("age".to_string(), "required|number".to_string());
///
/// let validator = Validator::new(&data, &rules).unwrap();
/// assert!(validator.fails());
/// assert_eq!(validator.first_error("age"), Some("The age must be a number"));
/// assert!(!validator.validated().contains_key("admin"));
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    errors: ValidationErrors,
    validated: SubmittedData,
}

impl Validator {
    /// Validate with the default templates and no record store.
    ///
    /// Rule sets using `unique` need [`Validator::builder`].
    pub fn new(data: &SubmittedData, rules: &RuleSpec) -> Result<Self> {
        Self::builder(data, rules).build()
    }

    pub fn builder<'a>(data: &'a SubmittedData, rules: &'a RuleSpec) -> ValidatorBuilder<'a> {
        ValidatorBuilder::new(data, rules)
    }

    /// Errors per field; fields that passed are absent
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Submitted fields that are declared in the rule spec
    pub fn validated(&self) -> &SubmittedData {
        &self.validated
    }

    pub fn passes(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fails(&self) -> bool {
        !self.passes()
    }

    pub fn first_error(&self, field: &str) -> Option<&str> {
        self.errors.first(field)
    }

    pub fn into_parts(self) -> (SubmittedData, ValidationErrors) {
        (self.validated, self.errors)
    }
}

/// Configures and runs a validation pass
pub struct ValidatorBuilder<'a> {
    data: &'a SubmittedData,
    rules: &'a RuleSpec,
    templates: MessageTemplates,
    store: Option<LazyRecordStore<'a>>,
    options: ValidatorOptions,
}

impl<'a> ValidatorBuilder<'a> {
    pub fn new(data: &'a SubmittedData, rules: &'a RuleSpec) -> Self {
        Self {
            data,
            rules,
            templates: MessageTemplates::default(),
            store: None,
            options: ValidatorOptions::default(),
        }
    }

    /// Use a custom template table
    pub fn templates(mut self, templates: MessageTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Answer `unique` rules from an open store
    pub fn record_store(mut self, store: impl RecordStore + 'a) -> Self {
        self.store = Some(LazyRecordStore::ready(store));
        self
    }

    /// Open the store only if a `unique` rule is evaluated
    pub fn connector<S, F>(mut self, connector: F) -> Self
    where
        S: RecordStore + 'a,
        F: FnOnce() -> std::result::Result<S, StoreError> + 'a,
    {
        self.store = Some(LazyRecordStore::new(connector));
        self
    }

    pub fn options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn identifier_column(mut self, column: impl Into<String>) -> Self {
        self.options.identifier_column = column.into();
        self
    }

    /// Run the validation pass.
    ///
    /// Every rule string is resolved before any field is evaluated, so a
    /// malformed declaration fails without querying the record store.
    pub fn build(self) -> Result<Validator> {
        let plan = self
            .rules
            .iter()
            .map(|(field, spec)| -> Result<(&str, Vec<Rule>)> {
                let rules = parse_rules(field, spec)?
                    .iter()
                    .map(|parsed| Rule::resolve(field, parsed))
                    .collect::<Result<Vec<_>>>()?;
                Ok((field.as_str(), rules))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut records = RecordAccess::new(self.store, self.options.identifier_column);
        let mut errors = ValidationErrors::new();

        for (field, rules) in &plan {
            evaluate_field(
                field,
                rules,
                self.data,
                &self.templates,
                &mut records,
                &mut errors,
            )?;
        }

        let validated: SubmittedData = self
            .data
            .iter()
            .filter(|(field, _)| self.rules.contains_key(*field))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();

        debug!(
            fields = plan.len(),
            failed_fields = errors.field_count(),
            errors = errors.len(),
            store_opened = records.is_connected(),
            "Validation finished"
        );

        Ok(Validator { errors, validated })
    }
}

fn evaluate_field(
    field: &str,
    rules: &[Rule],
    data: &SubmittedData,
    templates: &MessageTemplates,
    records: &mut RecordAccess<'_>,
    errors: &mut ValidationErrors,
) -> Result<()> {
    let nullable = rules.contains(&Rule::Nullable);
    let ctx = ValidationContext::new(field, data, nullable);

    if nullable && is_blank(ctx.value) {
        debug!(field = field, "Skipping blank nullable field");
        return Ok(());
    }

    debug!(field = field, rules = rules.len(), "Validating field");

    for rule in rules {
        let failure = rule.check(&ctx, records).inspect_err(|e| {
            warn!(field = field, rule = rule.name(), error = %e, "Rule could not be evaluated");
        })?;

        if let Some(failure) = failure {
            errors.add(render(field, failure, templates));
        }
    }

    Ok(())
}

fn render(field: &str, failure: Failure, templates: &MessageTemplates) -> ValidationError {
    let replacements: Vec<(&str, &str)> = failure
        .value
        .as_deref()
        .map(|value| ("value", value))
        .into_iter()
        .collect();
    let message = templates.render(failure.kind, field, &replacements);

    let error = ValidationError::new(field, failure.kind, message);
    match failure.value {
        Some(value) => error.with_value(value),
        None => error,
    }
}
