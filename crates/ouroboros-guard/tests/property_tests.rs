//! Property tests for grammar polarity and bound composition

use ouroboros_guard::builtins::*;
use ouroboros_guard::{FieldValidator, ValidatorRegistry, ValidatorSpec, Value};
use proptest::prelude::*;

fn s(text: &str) -> Value {
    Value::from(text)
}

proptest! {
    // ------------------------------------------------------------------
    // Numeric grammars
    // ------------------------------------------------------------------

    #[test]
    fn integer_accepts_signed_digits(text in "[+-]?[0-9]{0,12}") {
        prop_assert!(integer(&s(&text)).is_none());
    }

    #[test]
    fn integer_rejects_embedded_letters(text in "[0-9]{0,4}[a-z][0-9]{0,4}") {
        prop_assert_eq!(integer(&s(&text)).map(|e| e.code), Some("EINT".to_string()));
    }

    #[test]
    fn positive_integer_polarity(n in 1u64..u64::MAX, zeros in "0{1,3}") {
        prop_assert!(positive_integer(&s(&n.to_string())).is_none());
        let plus = format!("+{}", n);
        let padded = format!("{}{}", zeros, n);
        let minus = format!("-{}", n);
        prop_assert!(positive_integer(&s(&plus)).is_none());
        prop_assert!(positive_integer(&s(&padded)).is_some());
        prop_assert!(positive_integer(&s(&minus)).is_some());
    }

    #[test]
    fn negative_integer_polarity(n in 1i64..i64::MAX) {
        prop_assert!(negative_integer(&Value::Int(-n)).is_none());
        prop_assert!(negative_integer(&Value::Int(n)).is_some());
        prop_assert!(non_positive_integer(&Value::Int(-n)).is_none());
        prop_assert!(non_negative_integer(&Value::Int(n)).is_none());
        prop_assert!(non_negative_integer(&Value::Int(-n)).is_some());
    }

    #[test]
    fn number_accepts_decimal_forms(text in "[-+]?[0-9]{0,6}\\.?[0-9]{0,6}") {
        prop_assert!(number(&s(&text)).is_none());
    }

    #[test]
    fn number_rejects_exponents(mantissa in "[0-9]{1,4}", exp in "[0-9]{1,3}") {
        let text = format!("{}e{}", mantissa, exp);
        prop_assert!(number(&s(&text)).is_some());
    }

    #[test]
    fn signed_number_families(text in "[0-9]{1,6}\\.[0-9]{1,6}") {
        let negative = format!("-{}", text);
        prop_assert!(negative_number(&s(&negative)).is_none());
        prop_assert!(non_positive_number(&s(&negative)).is_none());
        prop_assert!(negative_number(&s(&text)).is_some());
        prop_assert!(non_negative_number(&s(&text)).is_none());
        prop_assert!(non_negative_number(&s(&negative)).is_some());
    }

    // ------------------------------------------------------------------
    // Format grammars
    // ------------------------------------------------------------------

    #[test]
    fn email_accepts_generated_addresses(
        local in "[a-zA-Z0-9._%+-]{1,12}",
        domain in "[a-z0-9-]{1,12}",
        tld in "[a-zA-Z]{2,6}",
    ) {
        let address = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(email(&s(&address)).is_none());
    }

    #[test]
    fn email_requires_at_sign(text in "[a-z0-9.]{1,20}") {
        prop_assert!(email(&s(&text)).is_some());
    }

    #[test]
    fn ip_accepts_every_dotted_quad(a: u8, b: u8, c: u8, d: u8) {
        let address = format!("{}.{}.{}.{}", a, b, c, d);
        prop_assert!(ip(&s(&address)).is_none());
    }

    #[test]
    fn ip_rejects_out_of_range_octet(a: u8, b: u8, c: u8, bad in 256u32..1000) {
        let address = format!("{}.{}.{}.{}", a, b, c, bad);
        prop_assert_eq!(ip(&s(&address)).map(|e| e.code), Some("EADDRESS".to_string()));
    }

    #[test]
    fn relative_url_polarity(
        path in "([a-z0-9_-][a-z0-9_/-]{0,19})?",
        host in "[a-z][a-z0-9]{0,10}\\.[a-z]{2,4}",
    ) {
        let relative = format!("/{}", path);
        prop_assert!(relative_url(&s(&relative)).is_none());
        prop_assert!(absolute_url(&s(&relative)).is_some());

        let network_path = format!("//{}", host);
        prop_assert_eq!(
            relative_url(&s(&network_path)).map(|e| e.code),
            Some("ERELURL".to_string())
        );
    }

    #[test]
    fn absolute_url_implies_url(
        host in "[a-z][a-z0-9]{0,10}",
        tld in "[a-z]{2,4}",
        path in "[a-z0-9/]{0,10}",
    ) {
        let address = format!("https://{}.{}/{}", host, tld, path);
        prop_assert!(absolute_url(&s(&address)).is_none());
        prop_assert!(url(&s(&address)).is_none());
    }

    // ------------------------------------------------------------------
    // Pattern polarity
    // ------------------------------------------------------------------

    #[test]
    fn pattern_fails_on_match(word in "[a-z]{3,8}", prefix in "[0-9]{0,4}") {
        let text = format!("{}{}", prefix, word.to_uppercase());
        let err = pattern(&s(&text), &regex::escape(&word));
        prop_assert_eq!(err.map(|e| e.code), Some("EREGEXP".to_string()));
    }

    #[test]
    fn pattern_passes_without_match(word in "[a-z]{3,8}", digits in "[0-9]{1,10}") {
        prop_assert!(pattern(&s(&digits), &word).is_none());
    }

    // ------------------------------------------------------------------
    // Bounds
    // ------------------------------------------------------------------

    #[test]
    fn range_fails_iff_either_bound_fails(
        v in -1000i64..1000,
        a in -1000i64..1000,
        b in -1000i64..1000,
    ) {
        let value = s(&v.to_string());
        let (min, max) = (Value::Int(a), Value::Int(b));

        let expected = min_value(&value, &min).is_some() || max_value(&value, &max).is_some();
        let result = range(&value, Some(&min), Some(&max));
        prop_assert_eq!(result.is_some(), expected);
        if let Some(err) = result {
            prop_assert_eq!(err.code, "ERANGE".to_string());
        }
    }

    #[test]
    fn min_value_matches_numeric_order(v in -1.0e6f64..1.0e6, bound in -1.0e6f64..1.0e6) {
        let value = s(&format!("{:.3}", v));
        let parsed: f64 = format!("{:.3}", v).parse().unwrap();
        prop_assert_eq!(min_value(&value, &Value::Float(bound)).is_some(), parsed < bound);
        prop_assert_eq!(max_value(&value, &Value::Float(bound)).is_some(), parsed > bound);
    }

    #[test]
    fn length_validators_ignore_non_strings(n: i64, bound in 0usize..100) {
        prop_assert!(min_length(&Value::Int(n), bound).is_none());
        prop_assert!(max_length(&Value::Int(n), bound).is_none());
    }

    #[test]
    fn length_validators_count_characters(text in "\\PC{0,20}", bound in 0usize..25) {
        let len = text.chars().count();
        prop_assert_eq!(min_length(&s(&text), bound).is_some(), len < bound);
        prop_assert_eq!(max_length(&s(&text), bound).is_some(), len > bound);
    }

    // ------------------------------------------------------------------
    // Idempotence
    // ------------------------------------------------------------------

    #[test]
    fn validation_is_idempotent(text in "\\PC{0,16}", min in 0i64..10) {
        let registry = ValidatorRegistry::with_builtins();
        let specs = vec![
            ValidatorSpec::new("minLength").arg(min),
            ValidatorSpec::new("number"),
            ValidatorSpec::new("pattern").arg("x"),
        ];
        let validator = FieldValidator::new(&registry, &specs);
        let value = s(&text);

        prop_assert_eq!(validator.validate(&value).unwrap(), validator.validate(&value).unwrap());
    }
}
