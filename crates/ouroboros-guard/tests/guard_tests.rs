//! End-to-end tests for the guard engine

use std::collections::BTreeMap;
use std::sync::Arc;

use ouroboros_guard::builtins;
use ouroboros_guard::*;

fn registry() -> Arc<ValidatorRegistry> {
    Arc::new(ValidatorRegistry::with_builtins())
}

// ============================================================================
// Lifecycle Listener
// ============================================================================

#[test]
fn test_min_length_rejects_short_name() {
    let schema = ModelSchema::new("user").field("name", [ValidatorSpec::new("minLength").arg(3)]);
    let listener = ValidationListener::new(registry(), schema);

    let aggregate = listener.validate(&Record::new().with("name", "ab")).unwrap();
    assert_eq!(aggregate.len(), 1);
    assert_eq!(aggregate.as_slice()[0].field, "name");
    assert_eq!(aggregate.as_slice()[0].error.code, "EMINLEN");
}

#[test]
fn test_min_length_accepts_long_name_and_save_proceeds() {
    let schema = ModelSchema::new("user").field("name", [ValidatorSpec::new("minLength").arg(3)]);
    let pipeline = SavePipeline::new().hook(ValidationListener::new(registry(), schema));

    let saved = pipeline.save(&Record::new().with("name", "abcd"), |_| true);
    assert_eq!(saved, Ok(true));
}

#[test]
fn test_failed_save_reports_every_violation() {
    let schema = ModelSchema::new("account")
        .field(
            "username",
            [
                ValidatorSpec::new("minLength").arg(4),
                ValidatorSpec::new("pattern").arg("^root"),
            ],
        )
        .field("homepage", [ValidatorSpec::new("absoluteUrl")])
        .field(
            "port",
            [
                ValidatorSpec::new("positiveInteger"),
                ValidatorSpec::new("maxValue").arg(65535),
            ],
        );
    let listener = ValidationListener::new(registry(), schema);

    let record = Record::new()
        .with("username", "rt")
        .with("homepage", "example.com")
        .with("port", "70000");
    let err = listener.before_save(&record).unwrap_err();

    let aggregate = err.aggregate().expect("validation failure");
    assert_eq!(aggregate.codes(), vec!["EMINLEN", "EABSURL", "EMAXVAL"]);

    let record = Record::new().with("username", "rootkit").with("port", "0");
    let aggregate = listener.validate(&record).unwrap();
    assert_eq!(aggregate.codes(), vec!["EREGEXP", "EPOS"]);
}

#[test]
fn test_schema_loaded_from_yaml() {
    let schema: ModelSchema = serde_yaml::from_str(
        r#"
model: server
fields:
  - field: address
    validators: [ip]
  - field: weight
    validators:
      - { name: range, args: [0, 1] }
"#,
    )
    .unwrap();
    let listener = ValidationListener::new(registry(), schema);

    let record: Record =
        serde_json::from_str(r#"{"address": "10.0.0.256", "weight": 1.5}"#).unwrap();
    let aggregate = listener.validate(&record).unwrap();
    assert_eq!(aggregate.codes(), vec!["EADDRESS", "ERANGE"]);

    let json = serde_json::to_value(&aggregate).unwrap();
    assert_eq!(json[1]["minValue"], serde_json::json!(0));
    assert_eq!(json[1]["maxValue"], serde_json::json!(1));
    assert_eq!(json[1]["message"], serde_json::json!("Value must be between 0 and 1"));
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_override_builtin_changes_outcome() {
    let registry = registry();
    let schema = ModelSchema::new("item").field("count", [ValidatorSpec::new("integer")]);
    let record = Record::new().with("count", "twelve");

    let listener = ValidationListener::new(registry.clone(), schema.clone());
    assert!(listener.before_save(&record).is_err());

    registry.register("integer", |_: &Value, _: &[Value]| -> Option<ValidationError> { None });
    let listener = ValidationListener::new(registry, schema);
    assert!(listener.before_save(&record).is_ok());
}

#[test]
fn test_custom_validator_with_custom_params() {
    let registry = registry();
    registry.register("oneOf", |value: &Value, args: &[Value]| {
        if args.contains(value) {
            return None;
        }
        let mut params = BTreeMap::new();
        params.insert("allowed".to_string(), Value::List(args.to_vec()));
        Some(
            ValidationError::new("EONEOF", "Value must be one of {allowed}")
                .with_params(ErrorParams::Custom(params)),
        )
    });

    let schema = ModelSchema::new("order")
        .field("currency", [ValidatorSpec::new("oneOf").arg("EUR").arg("USD")]);
    let listener = ValidationListener::new(registry, schema);

    assert!(listener.validate(&Record::new().with("currency", "EUR")).unwrap().is_empty());

    let aggregate = listener.validate(&Record::new().with("currency", "GBP")).unwrap();
    let error = &aggregate.as_slice()[0].error;
    assert_eq!(error.code, "EONEOF");
    assert_eq!(error.render(), r#"Value must be one of ["EUR","USD"]"#);
}

#[test]
fn test_isolated_registries_do_not_interfere() {
    let overridden = ValidatorRegistry::with_builtins();
    overridden.register("email", |_: &Value, _: &[Value]| -> Option<ValidationError> { None });
    let pristine = ValidatorRegistry::with_builtins();

    let value = Value::from("not-an-email");
    assert!(overridden.lookup("email").unwrap().validate(&value, &[]).is_none());
    assert!(pristine.lookup("email").unwrap().validate(&value, &[]).is_some());
}

// ============================================================================
// Field Validator
// ============================================================================

#[test]
fn test_two_failing_specs_give_two_errors_in_order() {
    let registry = ValidatorRegistry::with_builtins();
    let specs = vec![ValidatorSpec::new("email"), ValidatorSpec::new("maxLength").arg(3)];
    let errors = FieldValidator::new(&registry, &specs)
        .validate(&Value::from("abcdef"))
        .unwrap();

    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].code, "EEMAIL");
    assert_eq!(errors[1].code, "EMAXLEN");
}

#[test]
fn test_same_input_gives_equal_errors() {
    let registry = ValidatorRegistry::with_builtins();
    let specs = vec![ValidatorSpec::new("minValue").arg("2.5")];
    let validator = FieldValidator::new(&registry, &specs);

    let a = validator.validate(&Value::from("1")).unwrap();
    let b = validator.validate(&Value::from("1")).unwrap();
    assert_eq!(a, b);
    assert_eq!(a[0].params, ErrorParams::MinValue { min_value: Value::from("2.5") });
}

// ============================================================================
// Boundaries
// ============================================================================

#[test]
fn test_integer_sign_boundaries() {
    assert_eq!(
        builtins::positive_integer(&Value::from("0")).map(|e| e.code),
        Some("EPOS".to_string())
    );
    assert!(builtins::non_negative_integer(&Value::from("0")).is_none());
    assert_eq!(
        builtins::negative_integer(&Value::from("-0")).map(|e| e.code),
        Some("ENEG".to_string())
    );
}

#[test]
fn test_length_is_noop_for_numbers() {
    assert!(builtins::min_length(&Value::Int(42), 3).is_none());
    assert!(builtins::max_length(&Value::Int(42_000), 1).is_none());
}
