//! Configuration options for validation behavior

use serde::{Deserialize, Serialize};

// ============================================================================
// Policies
// ============================================================================

/// What to do when a spec names a validator the registry doesn't know
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownValidatorPolicy {
    /// Report `GuardError::UnknownValidator` (default)
    #[default]
    Reject,
    /// Log a warning and treat the spec as "no check"
    Skip,
}

/// What to do when a constrained field is absent from the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Don't validate absent fields; required-ness is the model layer's call
    #[default]
    Skip,
    /// Validate absent fields as `Value::Null`
    ValidateAsNull,
}

// ============================================================================
// Guard Config
// ============================================================================

/// Engine-wide validation policies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub unknown_validators: UnknownValidatorPolicy,
    pub missing_fields: MissingFieldPolicy,
}

impl GuardConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set unknown validator handling
    pub fn unknown_validators(mut self, policy: UnknownValidatorPolicy) -> Self {
        self.unknown_validators = policy;
        self
    }

    /// Skip unknown validators instead of rejecting them
    pub fn skip_unknown_validators(mut self) -> Self {
        self.unknown_validators = UnknownValidatorPolicy::Skip;
        self
    }

    /// Set missing field handling
    pub fn missing_fields(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_fields = policy;
        self
    }
}
