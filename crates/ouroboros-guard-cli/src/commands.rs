//! Command implementations for `og`
//!
//! Each command writes its report to the given writer and returns the
//! process exit code: 0 when everything passed, 1 on validation failures,
//! 2 on validator misconfiguration. All commands resolve validators through
//! the one registry `main` builds.

use anyhow::{Context, Result};
use clap::ValueEnum;
use ouroboros_guard::{
    FieldValidator, GuardConfig, ModelSchema, Record, SaveError, SaveHook, ValidationListener,
    ValidatorRegistry, ValidatorSpec, Value,
};
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub const EXIT_OK: i32 = 0;
pub const EXIT_INVALID: i32 = 1;
pub const EXIT_MISCONFIGURED: i32 = 2;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Load a JSON or YAML document, picked by file extension
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {}", path.display()))
    }
}

/// Parse a command-line literal as JSON, falling back to a plain string
pub fn parse_literal(text: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(text)
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(text.to_string()))
}

/// `og check`: validate a record file against a schema file
pub fn check(
    registry: &Arc<ValidatorRegistry>,
    schema_path: &Path,
    record_path: &Path,
    config_path: Option<&Path>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<i32> {
    let schema: ModelSchema = load_document(schema_path)?;
    let record: Record = load_document(record_path)?;
    let config: GuardConfig = match config_path {
        Some(path) => load_document(path)?,
        None => GuardConfig::default(),
    };

    tracing::debug!(model = %schema.model, fields = schema.fields.len(), "Loaded schema");

    let listener = ValidationListener::new(registry.clone(), schema).with_config(config);
    let model = listener.schema().model.as_str();

    match listener.before_save(&record) {
        Ok(()) => {
            match format {
                OutputFormat::Text => writeln!(out, "{}: ok", display_model(model))?,
                OutputFormat::Json => writeln!(
                    out,
                    "{}",
                    serde_json::json!({"model": model, "valid": true, "errors": []})
                )?,
            }
            Ok(EXIT_OK)
        }
        Err(SaveError::Validation(aggregate)) => {
            match format {
                OutputFormat::Text => {
                    writeln!(out, "{}: {}", display_model(model), aggregate)?;
                    for item in &aggregate {
                        writeln!(out, "  {}", item)?;
                    }
                }
                OutputFormat::Json => writeln!(
                    out,
                    "{}",
                    serde_json::json!({"model": model, "valid": false, "errors": aggregate})
                )?,
            }
            Ok(EXIT_INVALID)
        }
        Err(SaveError::Configuration(err)) => {
            match format {
                OutputFormat::Text => writeln!(out, "error[{}]: {}", err.code(), err)?,
                OutputFormat::Json => {
                    let error = serde_json::json!({"code": err.code(), "message": err.to_string()});
                    writeln!(out, "{}", serde_json::json!({"model": model, "error": error}))?
                }
            }
            Ok(EXIT_MISCONFIGURED)
        }
        Err(other) => Err(anyhow::anyhow!(other)),
    }
}

fn display_model(model: &str) -> &str {
    if model.is_empty() {
        "record"
    } else {
        model
    }
}

/// `og run`: run one registered validator against a literal value
pub fn run_single(
    registry: &ValidatorRegistry,
    name: &str,
    value: &str,
    args: &[String],
    out: &mut impl Write,
) -> Result<i32> {
    let specs = [ValidatorSpec::with_args(
        name,
        args.iter().map(|a| parse_literal(a)).collect(),
    )];

    let value = parse_literal(value);
    match FieldValidator::new(registry, &specs).validate(&value) {
        Ok(errors) if errors.is_empty() => {
            writeln!(out, "ok")?;
            Ok(EXIT_OK)
        }
        Ok(errors) => {
            for error in &errors {
                writeln!(out, "{}", error)?;
            }
            Ok(EXIT_INVALID)
        }
        Err(err) => {
            writeln!(out, "error[{}]: {}", err.code(), err)?;
            Ok(EXIT_MISCONFIGURED)
        }
    }
}

/// `og list`: print registered validator names
pub fn list(registry: &ValidatorRegistry, out: &mut impl Write) -> Result<i32> {
    for name in registry.names() {
        writeln!(out, "{}", name)?;
    }
    Ok(EXIT_OK)
}
