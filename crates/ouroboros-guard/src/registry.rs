//! Validator registry
//!
//! Maps validator names to [`Validator`] implementations. A registry is
//! usually built once during application wiring (built-ins plus any custom
//! validators) and then shared by reference with the field validators and
//! save listeners that resolve names through it.
//!
//! # Example
//!
//! ```rust
//! use ouroboros_guard::{ValidationError, ValidatorRegistry, Value};
//!
//! let registry = ValidatorRegistry::with_builtins();
//! registry.register("even", |value: &Value, _args: &[Value]| match value {
//!     Value::Int(i) if i % 2 != 0 => Some(ValidationError::new("EEVEN", "Value must be even")),
//!     _ => None,
//! });
//!
//! let even = registry.lookup("even").unwrap();
//! assert!(even.validate(&Value::Int(3), &[]).is_some());
//! ```

use crate::builtins::Builtin;
use crate::errors::{GuardError, ValidationError};
use crate::value::Value;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Validator Trait
// ============================================================================

/// A named check: `(value, args) -> error | none`
///
/// Implementations must be pure; the same value and arguments must always
/// produce equal results, and calls may run concurrently.
///
/// Polarity: return `None` when the value is acceptable. The built-in
/// `pattern` validator is the one exception in the built-in set (it fails on
/// a match); custom validators should follow the normal polarity.
pub trait Validator: Send + Sync {
    /// Validate a value with the spec's arguments
    fn validate(&self, value: &Value, args: &[Value]) -> Option<ValidationError>;

    /// Reject unusable arguments before any value is checked
    fn check_args(&self, _args: &[Value]) -> Result<(), GuardError> {
        Ok(())
    }
}

impl<F> Validator for F
where
    F: Fn(&Value, &[Value]) -> Option<ValidationError> + Send + Sync,
{
    fn validate(&self, value: &Value, args: &[Value]) -> Option<ValidationError> {
        self(value, args)
    }
}

impl Validator for Builtin {
    fn validate(&self, value: &Value, args: &[Value]) -> Option<ValidationError> {
        self.run(value, args)
    }

    fn check_args(&self, args: &[Value]) -> Result<(), GuardError> {
        Builtin::check_args(*self, args)
    }
}

/// Shared handle to a registered validator
pub type BoxedValidator = Arc<dyn Validator>;

// ============================================================================
// Registry
// ============================================================================

/// Name → validator mapping with last-write-wins registration
///
/// Lookups hand out an `Arc`, so overriding a name never affects a call that
/// already resolved the old validator.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: RwLock<HashMap<String, BoxedValidator>>,
}

static GLOBAL: Lazy<ValidatorRegistry> = Lazy::new(ValidatorRegistry::with_builtins);

impl ValidatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in validator set
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        {
            let mut validators = registry.validators.write();
            for builtin in Builtin::ALL {
                validators.insert(builtin.name().to_string(), Arc::new(builtin));
            }
        }
        registry
    }

    /// Process-wide registry, populated with the built-ins on first use
    pub fn global() -> &'static ValidatorRegistry {
        &GLOBAL
    }

    /// Register a validator, replacing any existing one with the same name
    pub fn register(&self, name: impl Into<String>, validator: impl Validator + 'static) {
        self.register_arc(name, Arc::new(validator));
    }

    /// Register an already shared validator
    pub fn register_arc(&self, name: impl Into<String>, validator: BoxedValidator) {
        let name = name.into();
        let replaced = self.validators.write().insert(name.clone(), validator).is_some();
        if replaced {
            tracing::info!(validator = %name, "Overrode registered validator");
        } else {
            tracing::debug!(validator = %name, "Registered validator");
        }
    }

    /// Resolve a validator by name
    pub fn lookup(&self, name: &str) -> Option<BoxedValidator> {
        self.validators.read().get(name).cloned()
    }

    /// Resolve a validator, reporting an unknown name as a configuration error
    pub fn resolve(&self, name: &str) -> Result<BoxedValidator, GuardError> {
        self.lookup(name).ok_or_else(|| GuardError::UnknownValidator {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.validators.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.validators.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.read().is_empty()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.names())
            .finish()
    }
}
