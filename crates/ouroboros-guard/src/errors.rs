//! Validation error types
//!
//! A failed check produces a [`ValidationError`]; a successful check produces
//! nothing at all (`None`). Misconfiguration (unknown validator names, bad
//! arguments) is a separate [`GuardError`] and never appears as a validation
//! failure.

use crate::value::Value;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Error Codes
// ============================================================================

/// Stable codes emitted by the built-in validators
pub mod codes {
    pub const EINT: &str = "EINT";
    pub const ENEG: &str = "ENEG";
    pub const ENONNEG: &str = "ENONNEG";
    pub const ENONPOS: &str = "ENONPOS";
    pub const EPOS: &str = "EPOS";
    pub const ENUMBER: &str = "ENUMBER";
    pub const EEMAIL: &str = "EEMAIL";
    pub const EURL: &str = "EURL";
    pub const EABSURL: &str = "EABSURL";
    pub const ERELURL: &str = "ERELURL";
    pub const EADDRESS: &str = "EADDRESS";
    pub const EMINLEN: &str = "EMINLEN";
    pub const EMAXLEN: &str = "EMAXLEN";
    pub const EMINVAL: &str = "EMINVAL";
    pub const EMAXVAL: &str = "EMAXVAL";
    pub const ERANGE: &str = "ERANGE";
    pub const EREGEXP: &str = "EREGEXP";

    /// Configuration error: a spec names a validator the registry doesn't know
    pub const EUNKNOWNVALIDATOR: &str = "EUNKNOWNVALIDATOR";
}

// ============================================================================
// Error Parameters
// ============================================================================

/// Contextual parameters attached to a [`ValidationError`]
///
/// Built-in parameterised validators get a typed variant each; custom
/// validators put whatever they need in [`ErrorParams::Custom`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ErrorParams {
    /// No parameters (format validators)
    #[default]
    None,
    MinLength { min_length: usize },
    MaxLength { max_length: usize },
    MinValue { min_value: Value },
    MaxValue { max_value: Value },
    /// Either bound may be absent when the spec only supplied one
    Range {
        min_value: Option<Value>,
        max_value: Option<Value>,
    },
    Pattern { pattern: String },
    /// Open extension map for caller-defined validators
    Custom(BTreeMap<String, Value>),
}

impl ErrorParams {
    /// Parameters as `(name, value)` pairs, using the camelCase names that
    /// message templates reference
    pub fn entries(&self) -> Vec<(Cow<'_, str>, Value)> {
        match self {
            Self::None => Vec::new(),
            Self::MinLength { min_length } => {
                vec![(Cow::Borrowed("minLength"), Value::from(*min_length))]
            }
            Self::MaxLength { max_length } => {
                vec![(Cow::Borrowed("maxLength"), Value::from(*max_length))]
            }
            Self::MinValue { min_value } => vec![(Cow::Borrowed("minValue"), min_value.clone())],
            Self::MaxValue { max_value } => vec![(Cow::Borrowed("maxValue"), max_value.clone())],
            Self::Range { min_value, max_value } => {
                let mut entries = Vec::with_capacity(2);
                if let Some(min) = min_value {
                    entries.push((Cow::Borrowed("minValue"), min.clone()));
                }
                if let Some(max) = max_value {
                    entries.push((Cow::Borrowed("maxValue"), max.clone()));
                }
                entries
            }
            Self::Pattern { pattern } => {
                vec![(Cow::Borrowed("pattern"), Value::String(pattern.clone()))]
            }
            Self::Custom(map) => map
                .iter()
                .map(|(k, v)| (Cow::Borrowed(k.as_str()), v.clone()))
                .collect(),
        }
    }

    /// Look up a single parameter by its template name
    pub fn get(&self, name: &str) -> Option<Value> {
        self.entries()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

// ============================================================================
// Single Validation Error
// ============================================================================

/// Descriptor for one failed check
///
/// Created fresh per failure and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Short symbolic tag (see [`codes`]), or a caller-defined code
    pub code: String,

    /// Message template; may reference params as `{minLength}`, `{maxValue}`...
    pub message: String,

    /// Validator-specific parameters
    pub params: ErrorParams,
}

impl ValidationError {
    /// Create a new validation error without parameters
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            params: ErrorParams::None,
        }
    }

    /// Attach parameters
    pub fn with_params(mut self, params: ErrorParams) -> Self {
        self.params = params;
        self
    }

    /// Message with `{param}` placeholders substituted
    pub fn render(&self) -> String {
        let mut rendered = self.message.clone();
        for (name, value) in self.params.entries() {
            let placeholder = format!("{{{}}}", name);
            if rendered.contains(&placeholder) {
                rendered = rendered.replace(&placeholder, &value.coerce_str());
            }
        }
        rendered
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.render())
    }
}

impl std::error::Error for ValidationError {}

/// Serialized as `{code, message, ...params}` with the message rendered
impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.params.entries();
        let mut map = serializer.serialize_map(Some(2 + entries.len()))?;
        map.serialize_entry("code", &self.code)?;
        map.serialize_entry("message", &self.render())?;
        for (name, value) in &entries {
            map.serialize_entry(name.as_ref(), value)?;
        }
        map.end()
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// A validation error attributed to a record field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub error: ValidationError,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error)
    }
}

/// Every validation failure collected for one record, in field declaration
/// order. Empty means the record passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateValidation {
    errors: Vec<FieldError>,
}

impl AggregateValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add a single error for a field
    pub fn add(&mut self, field: impl Into<String>, error: ValidationError) {
        self.errors.push(FieldError {
            field: field.into(),
            error,
        });
    }

    /// Add all errors produced for one field, keeping their order
    pub fn extend_field(&mut self, field: &str, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors.into_iter().map(|error| FieldError {
            field: field.to_string(),
            error,
        }));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    pub fn as_slice(&self) -> &[FieldError] {
        &self.errors
    }

    /// Errors reported for one field
    pub fn for_field<'a>(
        &'a self,
        field: &'a str,
    ) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| &e.error)
    }

    /// Error codes in report order
    pub fn codes(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.error.code.as_str()).collect()
    }

    /// Ok if nothing failed, Err carrying the full aggregate otherwise
    pub fn into_result(self) -> Result<(), AggregateValidation> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for AggregateValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())
    }
}

impl std::error::Error for AggregateValidation {}

impl<'a> IntoIterator for &'a AggregateValidation {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Serialized as a list of `{field, code, message, ...params}` objects
impl Serialize for AggregateValidation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.errors.len()))?;
        for item in &self.errors {
            seq.serialize_element(&SerializedFieldError(item))?;
        }
        seq.end()
    }
}

struct SerializedFieldError<'a>(&'a FieldError);

impl Serialize for SerializedFieldError<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let error = &self.0.error;
        let entries = error.params.entries();
        let mut map = serializer.serialize_map(Some(3 + entries.len()))?;
        map.serialize_entry("field", &self.0.field)?;
        map.serialize_entry("code", &error.code)?;
        map.serialize_entry("message", &error.render())?;
        for (name, value) in &entries {
            map.serialize_entry(name.as_ref(), value)?;
        }
        map.end()
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Misconfiguration detected while resolving or preparing validators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GuardError {
    #[error("Unknown validator: {name}")]
    UnknownValidator { name: String },

    #[error("Invalid arguments for validator '{validator}': {reason}")]
    InvalidArguments { validator: String, reason: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GuardError {
    pub(crate) fn invalid_args(validator: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            validator: validator.to_string(),
            reason: reason.into(),
        }
    }

    /// Machine-readable code for reporting
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownValidator { .. } => codes::EUNKNOWNVALIDATOR,
            Self::InvalidArguments { .. } => "EINVALIDARGS",
            Self::InvalidPattern { .. } => "EINVALIDPATTERN",
            Self::Internal(_) => "EINTERNAL",
        }
    }
}
