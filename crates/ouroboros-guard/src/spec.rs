//! Declarative constraint specs
//!
//! A [`ValidatorSpec`] is a validator name plus primitive arguments, so field
//! constraints can live in configuration. In JSON/YAML a spec is either a
//! bare name (`"email"`) or `{name, args}`:
//!
//! ```yaml
//! model: user
//! fields:
//!   - field: name
//!     validators:
//!       - { name: minLength, args: [3] }
//!       - { name: pattern, args: ["^admin"] }
//!   - field: email
//!     validators: [email]
//! ```

use crate::value::Value;
use serde::{Deserialize, Serialize};

// ============================================================================
// Validator Spec
// ============================================================================

/// Which validator to run for a field, and with what arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SpecRepr")]
pub struct ValidatorSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl ValidatorSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpecRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        args: Vec<Value>,
    },
}

impl From<SpecRepr> for ValidatorSpec {
    fn from(repr: SpecRepr) -> Self {
        match repr {
            SpecRepr::Name(name) => Self::new(name),
            SpecRepr::Full { name, args } => Self::with_args(name, args),
        }
    }
}

// ============================================================================
// Field Constraints / Model Schema
// ============================================================================

/// Ordered validator specs declared for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraints {
    pub field: String,
    #[serde(default)]
    pub validators: Vec<ValidatorSpec>,
}

impl FieldConstraints {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            validators: Vec::new(),
        }
    }

    pub fn validator(mut self, spec: ValidatorSpec) -> Self {
        self.validators.push(spec);
        self
    }
}

/// Constrained fields of one model, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub fields: Vec<FieldConstraints>,
}

impl ModelSchema {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            fields: Vec::new(),
        }
    }

    /// Declare specs for a field. Declaring the same field twice appends to
    /// its existing spec list.
    pub fn field(
        mut self,
        field: impl Into<String>,
        specs: impl IntoIterator<Item = ValidatorSpec>,
    ) -> Self {
        let field = field.into();
        match self.fields.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.validators.extend(specs),
            None => {
                let constraints = specs
                    .into_iter()
                    .fold(FieldConstraints::new(field), FieldConstraints::validator);
                self.fields.push(constraints);
            }
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldConstraints> {
        self.fields.iter().find(|f| f.field == field)
    }

    /// Every validator name the schema references, deduplicated
    pub fn validator_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for spec in self.fields.iter().flat_map(|f| &f.validators) {
            if !names.contains(&spec.name.as_str()) {
                names.push(&spec.name);
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let spec = ValidatorSpec::new("range").arg(1).arg(10);
        assert_eq!(spec.name, "range");
        assert_eq!(spec.args, vec![Value::Int(1), Value::Int(10)]);
    }

    #[test]
    fn test_deserialize_short_and_full_forms() {
        let specs: Vec<ValidatorSpec> = serde_json::from_str(
            r#"["email", {"name": "minLength", "args": [3]}, {"name": "url"}]"#,
        )
        .unwrap();
        assert_eq!(
            specs,
            vec![
                ValidatorSpec::new("email"),
                ValidatorSpec::new("minLength").arg(3),
                ValidatorSpec::new("url"),
            ]
        );
    }

    #[test]
    fn test_schema_keeps_declaration_order() {
        let schema = ModelSchema::new("user")
            .field("name", [ValidatorSpec::new("minLength").arg(3)])
            .field("email", [ValidatorSpec::new("email")])
            .field("name", [ValidatorSpec::new("maxLength").arg(20)]);

        let order: Vec<_> = schema.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(order, vec!["name", "email"]);
        assert_eq!(schema.get("name").unwrap().validators.len(), 2);
        assert_eq!(schema.validator_names(), vec!["minLength", "maxLength", "email"]);
    }

    #[test]
    fn test_field_constraints_builder_matches_document() {
        let built = FieldConstraints::new("age")
            .validator(ValidatorSpec::new("integer"))
            .validator(ValidatorSpec::new("range").arg(0).arg(150));
        let loaded: FieldConstraints = serde_json::from_str(
            r#"{"field": "age", "validators": ["integer", {"name": "range", "args": [0, 150]}]}"#,
        )
        .unwrap();
        assert_eq!(built, loaded);

        let schema = ModelSchema::new("user").field("age", built.validators.clone());
        assert_eq!(schema.get("age"), Some(&built));
    }

    #[test]
    fn test_schema_from_json() {
        let schema: ModelSchema = serde_json::from_value(serde_json::json!({
            "model": "user",
            "fields": [
                {"field": "age", "validators": [{"name": "range", "args": [0, 150]}]},
                {"field": "email", "validators": ["email"]}
            ]
        }))
        .unwrap();

        assert_eq!(schema.model, "user");
        assert_eq!(schema.fields.len(), 2);
        assert_eq!(schema.fields[0].validators[0], ValidatorSpec::new("range").arg(0).arg(150));
    }
}
