// Rule table

use crate::context::ValidationContext;
use crate::error::{Result, ValidatorError};
use crate::messages::ErrorKind;
use crate::parser::ParsedRule;
use crate::store::{LazyRecordStore, RecordQuery};
use crate::validators::{IsImage, IsNumber, IsText, IsTime, MaxSize, MinSize, OneOf};
use crate::value::{UploadedFile, is_empty_value, is_missing, text_of};
use serde_json::Value;
use tracing::trace;

/// Keyword that must appear as the third `unique` segment to enable exclusion
pub const EXCEPT_ID_KEYWORD: &str = "except_id";

/// Every rule name the table knows
pub const RULE_NAMES: [&str; 11] = [
    "nullable",
    "required",
    "required_if",
    "in",
    "string",
    "number",
    "time",
    "image",
    "min",
    "max",
    "unique",
];

/// File size bound in KB, keeping the declared text for messages
#[derive(Debug, Clone, PartialEq)]
pub struct SizeLimit {
    pub kilobytes: f64,
    pub declared: String,
}

/// `unique:table,column[,except_id,value]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueTarget {
    pub table: String,
    pub column: String,
    /// Identifier of the record to ignore, when `except_id` was given
    pub except_id: Option<String>,
}

/// A resolved rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Control keyword: skip the field when it is blank
    Nullable,
    Required,
    RequiredIf { field: String, expected: String },
    In(Vec<String>),
    String,
    Number,
    Time,
    Image,
    Min(SizeLimit),
    Max(SizeLimit),
    Unique(UniqueTarget),
}

/// A failed rule, before its message is rendered
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub value: Option<String>,
}

impl Failure {
    fn new(kind: ErrorKind) -> Self {
        Self { kind, value: None }
    }

    fn with_value(kind: ErrorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: Some(value.into()),
        }
    }
}

impl Rule {
    /// Resolve a parsed segment against the rule table.
    ///
    /// Unknown names, missing or stray parameters and malformed parameters
    /// are configuration errors.
    pub fn resolve(field: &str, parsed: &ParsedRule) -> Result<Rule> {
        let name = parsed.name.as_str();
        let parameter = parsed.parameter.as_deref();

        let invalid = |reason: &str| ValidatorError::InvalidParameter {
            field: field.to_string(),
            rule: name.to_string(),
            reason: reason.to_string(),
        };
        let bare = |rule: Rule| match parameter {
            None => Ok(rule),
            Some(_) => Err(ValidatorError::UnexpectedParameter {
                field: field.to_string(),
                rule: name.to_string(),
            }),
        };
        let required_parameter = || {
            parameter.ok_or_else(|| ValidatorError::MissingParameter {
                field: field.to_string(),
                rule: name.to_string(),
            })
        };

        match name {
            "nullable" => bare(Rule::Nullable),
            "required" => bare(Rule::Required),
            "string" => bare(Rule::String),
            "number" => bare(Rule::Number),
            "time" => bare(Rule::Time),
            "image" => bare(Rule::Image),
            "required_if" => {
                let segments: Vec<&str> = required_parameter()?.split(',').collect();
                let [other, expected] = segments.as_slice() else {
                    return Err(invalid("expected `other_field,value`"));
                };
                if other.is_empty() {
                    return Err(invalid("other field name is empty"));
                }
                Ok(Rule::RequiredIf {
                    field: other.to_string(),
                    expected: expected.to_string(),
                })
            }
            "in" => Ok(Rule::In(
                required_parameter()?.split(',').map(str::to_string).collect(),
            )),
            "min" | "max" => {
                let declared = required_parameter()?;
                let kilobytes = declared
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|kb| kb.is_finite() && *kb >= 0.0)
                    .ok_or_else(|| invalid("expected a size in KB"))?;
                let limit = SizeLimit {
                    kilobytes,
                    declared: declared.to_string(),
                };
                Ok(if name == "min" {
                    Rule::Min(limit)
                } else {
                    Rule::Max(limit)
                })
            }
            "unique" => {
                let segments: Vec<&str> = required_parameter()?.split(',').collect();
                let (table, column, rest) = match segments.as_slice() {
                    [table, column, rest @ ..] if rest.len() <= 2 => (*table, *column, rest),
                    _ => return Err(invalid("expected `table,column[,except_id,value]`")),
                };
                if table.is_empty() || column.is_empty() {
                    return Err(invalid("table and column must not be empty"));
                }
                let except_id = match rest {
                    [keyword, id] if *keyword == EXCEPT_ID_KEYWORD && !id.is_empty() => {
                        Some(id.to_string())
                    }
                    _ => None,
                };
                Ok(Rule::Unique(UniqueTarget {
                    table: table.to_string(),
                    column: column.to_string(),
                    except_id,
                }))
            }
            _ => Err(ValidatorError::UnknownRule {
                field: field.to_string(),
                rule: name.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rule::Nullable => "nullable",
            Rule::Required => "required",
            Rule::RequiredIf { .. } => "required_if",
            Rule::In(_) => "in",
            Rule::String => "string",
            Rule::Number => "number",
            Rule::Time => "time",
            Rule::Image => "image",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::Unique(_) => "unique",
        }
    }

    /// Run the rule for one field.
    ///
    /// `required` and `required_if` look at absence themselves; every other
    /// rule passes when the field's key is absent.
    pub fn check(
        &self,
        ctx: &ValidationContext<'_>,
        records: &mut RecordAccess<'_>,
    ) -> Result<Option<Failure>> {
        trace!(field = ctx.field, rule = self.name(), "Checking rule");

        match self {
            Rule::Nullable => return Ok(None),
            Rule::Required => {
                return Ok(is_missing(ctx.value).then(|| Failure::new(ErrorKind::Required)));
            }
            Rule::RequiredIf { field, expected } => {
                let triggered = ctx
                    .other(field)
                    .and_then(text_of)
                    .is_some_and(|other| other == expected.as_str());
                return Ok((triggered && is_empty_value(ctx.value))
                    .then(|| Failure::new(ErrorKind::Required)));
            }
            _ => {}
        }

        let Some(value) = ctx.value else {
            return Ok(None);
        };

        let failure = match self {
            Rule::In(allowed) => (!OneOf(allowed).check(value))
                .then(|| Failure::with_value(ErrorKind::In, allowed.join(", "))),
            Rule::String => (!IsText::check(value)).then(|| Failure::new(ErrorKind::String)),
            Rule::Number => (!IsNumber::check(value)).then(|| Failure::new(ErrorKind::Number)),
            Rule::Time => (!IsTime::check(value)).then(|| Failure::new(ErrorKind::Time)),
            Rule::Image => UploadedFile::from_value(value)
                .filter(|file| !IsImage::check(file))
                .map(|_| Failure::new(ErrorKind::Image)),
            Rule::Min(limit) => UploadedFile::from_value(value)
                .filter(|file| !MinSize(limit.kilobytes).check(file))
                .map(|_| Failure::with_value(ErrorKind::Min, limit.declared.as_str())),
            Rule::Max(limit) => UploadedFile::from_value(value)
                .filter(|file| !MaxSize(limit.kilobytes).check(file))
                .map(|_| Failure::with_value(ErrorKind::Max, limit.declared.as_str())),
            Rule::Unique(target) => (records.count(ctx.field, target, value)? > 0)
                .then(|| Failure::new(ErrorKind::Unique)),
            Rule::Nullable | Rule::Required | Rule::RequiredIf { .. } => None,
        };

        Ok(failure)
    }
}

/// Record store access for `unique`, shared by every field of a run
pub struct RecordAccess<'a> {
    store: Option<LazyRecordStore<'a>>,
    identifier_column: String,
}

impl<'a> RecordAccess<'a> {
    pub fn new(store: Option<LazyRecordStore<'a>>, identifier_column: impl Into<String>) -> Self {
        Self {
            store,
            identifier_column: identifier_column.into(),
        }
    }

    /// No store configured
    pub fn none() -> Self {
        Self::new(None, crate::DEFAULT_IDENTIFIER_COLUMN)
    }

    pub fn is_connected(&self) -> bool {
        self.store.as_ref().is_some_and(LazyRecordStore::is_connected)
    }

    /// Count records that already hold `value` for the target column
    pub fn count(&mut self, field: &str, target: &UniqueTarget, value: &Value) -> Result<u64> {
        let store = self
            .store
            .as_mut()
            .ok_or_else(|| ValidatorError::MissingRecordStore {
                field: field.to_string(),
            })?
            .get()?;

        let mut query = RecordQuery::new(&target.table, &target.column, value);
        if let Some(id) = target.except_id.as_deref() {
            query = query.except(&self.identifier_column, id);
        }

        Ok(store.exists_record(&query)?)
    }
}
