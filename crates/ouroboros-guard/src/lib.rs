//! Ouroboros Guard
//!
//! Named, composable field validators for Ouroboros models, and the
//! before-save hook that gates persistence on them.
//!
//! # Architecture
//!
//! ```text
//! ModelSchema (field -> [ValidatorSpec])
//!        │
//!        ▼
//! ValidationListener ──► FieldValidator ──► ValidatorRegistry ──► Builtin / custom Validator
//!        │                                                              │
//!        ▼                                                              ▼
//! AggregateValidation  ◄───────────── (field, ValidationError) ◄── Option<ValidationError>
//! ```
//!
//! - **builtins**: the built-in validator set (`integer`, `email`, `minLength`,
//!   `range`, `pattern`, ...)
//! - **registry**: name → validator mapping, extendable at configuration time
//! - **field**: runs every spec declared for one field
//! - **listener**: validates a whole record before save; `SavePipeline` layers
//!   further hooks on top
//!
//! Note that `pattern` fails when the value *matches* its regex, unlike every
//! other built-in.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ouroboros_guard::{
//!     ModelSchema, Record, SaveError, SaveHook, ValidationListener, ValidatorRegistry,
//!     ValidatorSpec,
//! };
//!
//! let schema = ModelSchema::new("user")
//!     .field("name", [ValidatorSpec::new("minLength").arg(3)])
//!     .field("email", [ValidatorSpec::new("email")]);
//! let listener = ValidationListener::new(Arc::new(ValidatorRegistry::with_builtins()), schema);
//!
//! let record = Record::new().with("name", "ab").with("email", "ab@example.com");
//! match listener.before_save(&record) {
//!     Err(SaveError::Validation(aggregate)) => assert_eq!(aggregate.codes(), vec!["EMINLEN"]),
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```

// Public modules
pub mod builtins;
pub mod config;
pub mod errors;
pub mod field;
pub mod formats;
pub mod listener;
pub mod registry;
pub mod spec;
pub mod value;

// Re-export commonly used types
pub use builtins::Builtin;
pub use config::{GuardConfig, MissingFieldPolicy, UnknownValidatorPolicy};
pub use errors::{codes, AggregateValidation, ErrorParams, FieldError, GuardError, ValidationError};
pub use field::FieldValidator;
pub use listener::{FnSaveHook, Record, SaveError, SaveHook, SavePipeline, ValidationListener};
pub use registry::{BoxedValidator, Validator, ValidatorRegistry};
pub use spec::{FieldConstraints, ModelSchema, ValidatorSpec};
pub use value::Value;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
