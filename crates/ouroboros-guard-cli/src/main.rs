//! Ouroboros Guard CLI
//!
//! Usage:
//!   og check --schema user.yaml --record user.json   Validate a record
//!   og check ... --format json                       Machine-readable report
//!   og check ... --config guard.yaml                 Engine policies
//!   og run minLength '"ab"' 3                        Run one validator
//!   og list                                          List validator names
//!
//! Exit codes: 0 valid, 1 validation failed, 2 validator misconfiguration.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ouroboros_guard::ValidatorRegistry;
use std::path::PathBuf;
use std::sync::Arc;

use commands::OutputFormat;

#[derive(Parser)]
#[command(name = "og")]
#[command(about = "Ouroboros field validation CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a record against a model schema
    Check {
        /// Schema file (JSON or YAML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Record file (JSON or YAML object of field values)
        #[arg(short, long)]
        record: PathBuf,

        /// Engine config file (JSON or YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Run a single validator against a value
    Run {
        /// Validator name (e.g. minLength)
        validator: String,

        /// Value to check (parsed as JSON, otherwise taken as a string)
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Validator arguments (each parsed as JSON, otherwise a string)
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List registered validators
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let registry = Arc::new(ValidatorRegistry::with_builtins());
    let mut stdout = std::io::stdout().lock();
    let exit_code = match cli.command {
        Commands::Check {
            schema,
            record,
            config,
            format,
        } => commands::check(
            &registry,
            &schema,
            &record,
            config.as_deref(),
            format,
            &mut stdout,
        )?,
        Commands::Run {
            validator,
            value,
            args,
        } => commands::run_single(&registry, &validator, &value, &args, &mut stdout)?,
        Commands::List => commands::list(&registry, &mut stdout)?,
    };

    if exit_code != commands::EXIT_OK {
        drop(stdout);
        std::process::exit(exit_code);
    }
    Ok(())
}

/// Initialize logging based on log level
fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized

    Ok(())
}
