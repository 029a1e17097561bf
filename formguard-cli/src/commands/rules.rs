//! Rules command
//!
//! Resolves every rule string of the configured forms and lists them.

use crate::error::CliResult;
use colored::Colorize;
use formguard_config::ValidationConfig;
use formguard_validation::RULE_NAMES;

pub fn execute(config: &ValidationConfig, form: Option<&str>) -> CliResult<()> {
    let forms: Vec<&str> = match form {
        Some(name) => vec![name],
        None => config.form_names().collect(),
    };

    for name in &forms {
        config.check_form(name)?;
    }

    if forms.is_empty() {
        println!("No rule sets configured.");
        println!("Available rules: {}", RULE_NAMES.join(", "));
        return Ok(());
    }

    for name in &forms {
        let rules = config.rules_for(name)?;
        println!("{} ({} fields)", name.bold(), rules.len());

        let width = rules.keys().map(String::len).max().unwrap_or(0);
        for (field, spec) in rules {
            println!("  {:width$}  {}", field, spec, width = width);
        }
    }

    println!();
    println!("{} {} rule set(s) valid", "✓".green(), forms.len());
    Ok(())
}
