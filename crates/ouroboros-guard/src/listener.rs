//! Save lifecycle hooks
//!
//! [`ValidationListener`] is the before-save hook that validates a record's
//! constrained fields. It can be used on its own or as one hook in a
//! [`SavePipeline`], which runs hooks in order and only calls the persist
//! step when every hook approves.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ouroboros_guard::{
//!     ModelSchema, Record, SaveHook, ValidationListener, ValidatorRegistry, ValidatorSpec,
//! };
//!
//! let schema = ModelSchema::new("user").field("name", [ValidatorSpec::new("minLength").arg(3)]);
//! let listener = ValidationListener::new(Arc::new(ValidatorRegistry::with_builtins()), schema);
//!
//! assert!(listener.before_save(&Record::new().with("name", "abcd")).is_ok());
//! assert!(listener.before_save(&Record::new().with("name", "ab")).is_err());
//! ```

use crate::config::{GuardConfig, MissingFieldPolicy};
use crate::errors::{AggregateValidation, GuardError};
use crate::field::{run_resolved, FieldValidator, ResolvedSpec};
use crate::registry::ValidatorRegistry;
use crate::spec::ModelSchema;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Record
// ============================================================================

/// Current field values of a record about to be saved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<Value> for Record {
    type Error = GuardError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(fields.into_iter().collect()),
            other => Err(GuardError::Internal(format!(
                "record must be an object, got {}",
                other.type_name()
            ))),
        }
    }
}

// ============================================================================
// Save Errors
// ============================================================================

/// Why a save was not allowed to proceed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    /// One or more constrained fields failed; carries every violation
    #[error("Validation failed: {0}")]
    Validation(AggregateValidation),

    #[error("Validator configuration error: {0}")]
    Configuration(#[from] GuardError),

    /// A layered hook refused the save
    #[error("Save rejected by hook '{hook}': {reason}")]
    Rejected { hook: String, reason: String },

    /// A hook panicked or otherwise failed unexpectedly
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SaveError {
    /// The validation aggregate, if this is a validation failure
    pub fn aggregate(&self) -> Option<&AggregateValidation> {
        match self {
            Self::Validation(aggregate) => Some(aggregate),
            _ => None,
        }
    }
}

// ============================================================================
// Save Hook Trait
// ============================================================================

/// A check the save pipeline runs before persisting a record
pub trait SaveHook: Send + Sync {
    /// Name used in logs and rejection errors
    fn name(&self) -> &str;

    /// Approve (`Ok`) or refuse (`Err`) the save
    fn before_save(&self, record: &Record) -> Result<(), SaveError>;
}

/// Save hook backed by a function
pub struct FnSaveHook<F>
where
    F: Fn(&Record) -> Result<(), SaveError> + Send + Sync,
{
    name: String,
    hook_fn: F,
}

impl<F> FnSaveHook<F>
where
    F: Fn(&Record) -> Result<(), SaveError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, hook_fn: F) -> Self {
        Self {
            name: name.into(),
            hook_fn,
        }
    }
}

impl<F> SaveHook for FnSaveHook<F>
where
    F: Fn(&Record) -> Result<(), SaveError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn before_save(&self, record: &Record) -> Result<(), SaveError> {
        (self.hook_fn)(record)
    }
}

/// Run a hook, turning a panic into `SaveError::Internal`
fn guarded(hook: &dyn SaveHook, record: &Record) -> Result<(), SaveError> {
    panic::catch_unwind(AssertUnwindSafe(|| hook.before_save(record))).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!(hook = %hook.name(), error = %message, "Save hook panicked");
        Err(SaveError::Internal(format!("hook '{}' panicked: {}", hook.name(), message)))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================================================
// Validation Listener
// ============================================================================

/// Before-save hook validating every constrained field of a model
pub struct ValidationListener {
    registry: Arc<ValidatorRegistry>,
    schema: ModelSchema,
    config: GuardConfig,
}

impl ValidationListener {
    pub fn new(registry: Arc<ValidatorRegistry>, schema: ModelSchema) -> Self {
        Self {
            registry,
            schema,
            config: GuardConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GuardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Validate a record and return the full aggregate.
    ///
    /// Every field's specs are resolved before any check runs, so a
    /// configuration error never comes with a partial aggregate. Fields are
    /// reported in declaration order.
    pub fn validate(&self, record: &Record) -> Result<AggregateValidation, GuardError> {
        let mut resolved: Vec<(&str, Vec<ResolvedSpec<'_>>)> =
            Vec::with_capacity(self.schema.fields.len());
        for constraints in &self.schema.fields {
            let specs = FieldValidator::new(&self.registry, &constraints.validators)
                .with_config(self.config)
                .resolve()?;
            resolved.push((constraints.field.as_str(), specs));
        }

        let null = Value::Null;
        let mut aggregate = AggregateValidation::new();
        for (field, specs) in &resolved {
            let value = match (record.get(field), self.config.missing_fields) {
                (Some(value), _) => value,
                (None, MissingFieldPolicy::ValidateAsNull) => &null,
                (None, MissingFieldPolicy::Skip) => {
                    tracing::debug!(field = %field, "Skipping absent field");
                    continue;
                }
            };

            let errors = run_resolved(specs, value);
            tracing::debug!(
                field = %field,
                checks = specs.len(),
                failures = errors.len(),
                "Validated field"
            );
            aggregate.extend_field(field, errors);
        }

        Ok(aggregate)
    }

    /// Run the hook and hand the outcome to `done`.
    ///
    /// `done` is called exactly once, whether the record passes, fails
    /// validation, or a validator panics.
    pub fn before_save_then<R>(
        &self,
        record: &Record,
        done: impl FnOnce(Result<(), SaveError>) -> R,
    ) -> R {
        done(guarded(self, record))
    }
}

impl SaveHook for ValidationListener {
    fn name(&self) -> &str {
        "validation"
    }

    fn before_save(&self, record: &Record) -> Result<(), SaveError> {
        let aggregate = self.validate(record)?;
        if aggregate.is_empty() {
            return Ok(());
        }

        tracing::info!(
            model = %self.schema.model,
            errors = aggregate.len(),
            "Rejected save: validation failed"
        );
        Err(SaveError::Validation(aggregate))
    }
}

impl std::fmt::Debug for ValidationListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationListener")
            .field("model", &self.schema.model)
            .field("fields", &self.schema.fields.len())
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// Save Pipeline
// ============================================================================

/// Ordered before-save hooks in front of a persist step
#[derive(Default)]
pub struct SavePipeline {
    hooks: Vec<Box<dyn SaveHook>>,
}

impl SavePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook; hooks run in registration order
    pub fn add_hook(&mut self, hook: impl SaveHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// Builder-style [`SavePipeline::add_hook`]
    pub fn hook(mut self, hook: impl SaveHook + 'static) -> Self {
        self.add_hook(hook);
        self
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Run every hook, stopping at the first refusal
    pub fn run_hooks(&self, record: &Record) -> Result<(), SaveError> {
        for hook in &self.hooks {
            tracing::debug!(hook = %hook.name(), "Running save hook");
            if let Err(e) = guarded(hook.as_ref(), record) {
                tracing::info!(hook = %hook.name(), error = %e, "Save hook refused record");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Run the hooks and, only if all approve, persist the record
    pub fn save<T>(
        &self,
        record: &Record,
        persist: impl FnOnce(&Record) -> T,
    ) -> Result<T, SaveError> {
        self.run_hooks(record)?;
        Ok(persist(record))
    }
}

impl std::fmt::Debug for SavePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavePipeline")
            .field("hooks", &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
