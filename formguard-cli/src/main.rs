//! formguard CLI - validate JSON payloads against configured rule sets.
//!
//! # Commands
//!
//! - `formguard validate --config <file> --form <name> --data <payload.json>` -
//!   Validate a payload; exits 0 when valid, 1 when validation failed
//! - `formguard rules --config <file>` - Check and list the configured rule sets
//!
//! Configuration and IO errors exit with status 2.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use formguard_config::{LogLevel, ValidationConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

mod commands;
mod error;

use commands::{rules, validate};
use error::{CliError, CliResult};

/// formguard - declarative form validation
#[derive(Parser)]
#[command(name = "formguard")]
#[command(version)]
#[command(about = "Validate submitted form data against pipe-delimited rule strings")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Rules file (TOML, JSON or .env)
    #[arg(short, long, global = true, env = "FORMGUARD_CONFIG", default_value = "formguard.toml")]
    config: PathBuf,

    /// Load environment overrides from this .env file first
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON payload against a rule set
    #[command(alias = "v")]
    Validate(ValidateArgs),

    /// Check and list the configured rule sets
    #[command(alias = "r")]
    Rules(RulesArgs),
}

#[derive(Args)]
struct ValidateArgs {
    /// Name of the rule set under `[forms]`
    #[arg(short, long)]
    form: String,

    /// JSON object with the submitted data
    #[arg(short, long)]
    data: PathBuf,

    /// JSON fixtures for `unique` rules: `{"table": [{...}, ...]}`
    #[arg(long)]
    records: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct RulesArgs {
    /// Only check this rule set
    #[arg(short, long)]
    form: Option<String>,
}

fn load_config(cli: &Cli) -> CliResult<ValidationConfig> {
    ValidationConfig::load_dotenv(cli.env_file.as_deref())?;

    let mut config = ValidationConfig::load_file(&cli.config)?;
    config.apply_env()?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    Ok(config)
}

fn run(cli: Cli) -> CliResult<u8> {
    let config = load_config(&cli)?;
    config.logging.clone().init();
    info!(
        path = %cli.config.display(),
        forms = config.forms.len(),
        identifier_column = %config.options.identifier_column,
        "Loaded validation config"
    );

    match cli.command {
        Commands::Validate(args) => validate::execute(
            &config,
            &args.form,
            &args.data,
            args.records.as_deref(),
            args.pretty,
        )
        .map(validate::Outcome::exit_code),
        Commands::Rules(args) => rules::execute(&config, args.form.as_deref()).map(|()| 0),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::from(CliError::EXIT_CODE)
        }
    }
}
