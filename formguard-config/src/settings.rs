// Validation settings: named rule sets, message templates and options

use crate::env::EnvLoader;
use crate::loader::{ConfigLoader, FileFormat};
use crate::logging::LogConfig;
use crate::{ConfigError, Result};
use formguard_validation::{
    ErrorKind, MessageTemplates, Rule, RuleSpec, SubmittedData, Validator, ValidatorBuilder,
    ValidatorOptions, parse_rules,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

const MESSAGE_PREFIX: &str = "message_";

/// Everything a formguard run needs besides the submitted data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    #[serde(flatten)]
    pub options: ValidatorOptions,
    pub logging: LogConfig,
    /// Template overrides keyed by error kind name
    pub messages: IndexMap<String, String>,
    /// Named rule sets
    pub forms: IndexMap<String, RuleSpec>,
}

impl ValidationConfig {
    /// Load from a JSON, TOML or `.env` file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;
        let config = Self::from_value(loader.load_file(path)?)?;

        info!(
            path = %path.display(),
            format = ?loader.format(),
            forms = config.forms.len(),
            "Loaded validation config"
        );

        Ok(config)
    }

    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        Self::from_value(ConfigLoader::new(format).parse(content)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| ConfigError::ParseError(format!("Invalid configuration: {}", e)))
    }

    /// Load variables from a `.env` file into the process environment.
    ///
    /// With no path, a missing `.env` in the working directory is not an error.
    pub fn load_dotenv(path: Option<&Path>) -> Result<()> {
        let loaded = match path {
            Some(path) => dotenvy::from_path(path).map(|_| ()),
            None => match dotenvy::dotenv() {
                Ok(_) => Ok(()),
                Err(e) if e.not_found() => Ok(()),
                Err(e) => Err(e),
            },
        };

        loaded.map_err(|e| ConfigError::LoadError(format!("Failed to load .env: {}", e)))
    }

    /// Apply `FORMGUARD_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(EnvLoader::formguard().load())
    }

    /// Apply overrides keyed like `EnvLoader` output (`log_level`, `message_required`)
    pub fn apply_vars(&mut self, vars: HashMap<String, String>) -> Result<()> {
        for (key, value) in vars {
            match key.as_str() {
                "identifier_column" => {
                    if value.is_empty() {
                        return Err(ConfigError::InvalidValue { key, value });
                    }
                    self.options.identifier_column = value;
                }
                "log_level" => self.logging.level = value.parse()?,
                "log_format" => self.logging.format = value.parse()?,
                "log_filter" => self.logging.env_filter = Some(value),
                _ => match key.strip_prefix(MESSAGE_PREFIX) {
                    Some(kind) => {
                        let kind: ErrorKind = kind
                            .parse()
                            .map_err(|_| ConfigError::UnknownMessageKind(kind.to_string()))?;
                        self.messages.insert(kind.as_str().to_string(), value);
                    }
                    None => {
                        debug!(key = %key, "Ignoring unrecognized override");
                        continue;
                    }
                },
            }
            debug!(key = %key, "Applied environment override");
        }

        Ok(())
    }

    pub fn rules_for(&self, form: &str) -> Result<&RuleSpec> {
        self.forms
            .get(form)
            .ok_or_else(|| ConfigError::FormNotFound(form.to_string()))
    }

    pub fn form_names(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(String::as_str)
    }

    /// Default templates with the `[messages]` overrides applied
    pub fn templates(&self) -> Result<MessageTemplates> {
        let mut templates = MessageTemplates::default();
        for (name, template) in &self.messages {
            let kind: ErrorKind = name
                .parse()
                .map_err(|_| ConfigError::UnknownMessageKind(name.clone()))?;
            templates.set(kind, template.clone());
        }
        Ok(templates)
    }

    pub fn options(&self) -> ValidatorOptions {
        self.options.clone()
    }

    /// Resolve every rule string of every form without validating anything
    pub fn check_rules(&self) -> Result<()> {
        self.forms.keys().try_for_each(|form| self.check_form(form))
    }

    /// Resolve the rule strings of one form
    pub fn check_form(&self, form: &str) -> Result<()> {
        for (field, spec) in self.rules_for(form)? {
            let resolved = parse_rules(field, spec).and_then(|parsed| {
                parsed
                    .iter()
                    .map(|p| Rule::resolve(field, p))
                    .collect::<formguard_validation::Result<Vec<_>>>()
            });

            if let Err(source) = resolved {
                return Err(ConfigError::InvalidRules {
                    form: form.to_string(),
                    source,
                });
            }
        }
        Ok(())
    }

    /// A validator builder for `form` with this config's templates and options
    pub fn builder<'a>(
        &'a self,
        form: &str,
        data: &'a SubmittedData,
    ) -> Result<ValidatorBuilder<'a>> {
        let rules = self.rules_for(form)?;
        Ok(Validator::builder(data, rules)
            .templates(self.templates()?)
            .options(self.options()))
    }
}
