//! Field validator: run every spec declared for one field

use crate::config::{GuardConfig, UnknownValidatorPolicy};
use crate::errors::{GuardError, ValidationError};
use crate::registry::{BoxedValidator, ValidatorRegistry};
use crate::spec::ValidatorSpec;
use crate::value::Value;

/// A spec paired with the validator it resolved to
pub struct ResolvedSpec<'a> {
    pub spec: &'a ValidatorSpec,
    pub validator: BoxedValidator,
}

/// Binds a field's specs to a registry
///
/// All specs are resolved and argument-checked before any value is looked
/// at, so misconfiguration surfaces as a [`GuardError`] rather than as a
/// partial result. Every resolved validator then runs; a field can report
/// several errors at once, in spec order.
pub struct FieldValidator<'a> {
    registry: &'a ValidatorRegistry,
    specs: &'a [ValidatorSpec],
    config: GuardConfig,
}

impl<'a> FieldValidator<'a> {
    pub fn new(registry: &'a ValidatorRegistry, specs: &'a [ValidatorSpec]) -> Self {
        Self {
            registry,
            specs,
            config: GuardConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GuardConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve every spec through the registry and check its arguments
    pub fn resolve(&self) -> Result<Vec<ResolvedSpec<'a>>, GuardError> {
        let mut resolved = Vec::with_capacity(self.specs.len());
        for spec in self.specs {
            let validator = match self.registry.lookup(&spec.name) {
                Some(validator) => validator,
                None => match self.config.unknown_validators {
                    UnknownValidatorPolicy::Reject => {
                        return Err(GuardError::UnknownValidator {
                            name: spec.name.clone(),
                        });
                    }
                    UnknownValidatorPolicy::Skip => {
                        tracing::warn!(validator = %spec.name, "Skipping unknown validator");
                        continue;
                    }
                },
            };
            validator.check_args(&spec.args)?;
            resolved.push(ResolvedSpec { spec, validator });
        }
        Ok(resolved)
    }

    /// Validate a value against every spec
    pub fn validate(&self, value: &Value) -> Result<Vec<ValidationError>, GuardError> {
        Ok(run_resolved(&self.resolve()?, value))
    }
}

/// Run already resolved specs; all of them run, failures kept in order
pub fn run_resolved(resolved: &[ResolvedSpec<'_>], value: &Value) -> Vec<ValidationError> {
    resolved
        .iter()
        .filter_map(|r| r.validator.validate(value, &r.spec.args))
        .collect()
}
