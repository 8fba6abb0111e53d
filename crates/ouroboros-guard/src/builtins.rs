//! Built-in validator set
//!
//! Each validator is a pure function of the candidate value (plus bound or
//! pattern arguments) returning `None` on success or a fresh
//! [`ValidationError`] on failure. They are available as free functions for
//! direct use and, through [`Builtin`], under their registry names
//! (`integer`, `minLength`, `range`, ...).
//!
//! # Polarity of `pattern`
//!
//! Every validator here passes when its grammar or bound is satisfied,
//! **except [`pattern`]**: it fails when the value *matches* the supplied
//! regex. A `pattern` spec is a deny-list, not an allow-list.

use crate::errors::{codes, ErrorParams, GuardError, ValidationError};
use crate::formats;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use std::collections::HashMap;

// ============================================================================
// Builtin Catalogue
// ============================================================================

/// The built-in validators, addressable by registry name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Integer,
    NegativeInteger,
    NonNegativeInteger,
    NonPositiveInteger,
    PositiveInteger,
    Number,
    NegativeNumber,
    NonNegativeNumber,
    NonPositiveNumber,
    Email,
    Url,
    AbsoluteUrl,
    RelativeUrl,
    Ip,
    MinLength,
    MaxLength,
    MinValue,
    MaxValue,
    Range,
    Pattern,
}

impl Builtin {
    pub const ALL: [Builtin; 20] = [
        Self::Integer,
        Self::NegativeInteger,
        Self::NonNegativeInteger,
        Self::NonPositiveInteger,
        Self::PositiveInteger,
        Self::Number,
        Self::NegativeNumber,
        Self::NonNegativeNumber,
        Self::NonPositiveNumber,
        Self::Email,
        Self::Url,
        Self::AbsoluteUrl,
        Self::RelativeUrl,
        Self::Ip,
        Self::MinLength,
        Self::MaxLength,
        Self::MinValue,
        Self::MaxValue,
        Self::Range,
        Self::Pattern,
    ];

    /// Registry name
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::NegativeInteger => "negativeInteger",
            Self::NonNegativeInteger => "nonNegativeInteger",
            Self::NonPositiveInteger => "nonPositiveInteger",
            Self::PositiveInteger => "positiveInteger",
            Self::Number => "number",
            Self::NegativeNumber => "negativeNumber",
            Self::NonNegativeNumber => "nonNegativeNumber",
            Self::NonPositiveNumber => "nonPositiveNumber",
            Self::Email => "email",
            Self::Url => "url",
            Self::AbsoluteUrl => "absoluteUrl",
            Self::RelativeUrl => "relativeUrl",
            Self::Ip => "ip",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::MinValue => "minValue",
            Self::MaxValue => "maxValue",
            Self::Range => "range",
            Self::Pattern => "pattern",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Check a spec's argument list before the validator is used.
    ///
    /// Format validators take no arguments; the parameterised ones need a
    /// usable bound or pattern.
    pub fn check_args(self, args: &[Value]) -> Result<(), GuardError> {
        let name = self.name();
        match self {
            Self::MinLength | Self::MaxLength => {
                expect_arity(name, args, 1)?;
                as_length(&args[0]).map(|_| ()).ok_or_else(|| {
                    GuardError::invalid_args(name, "length bound must be a non-negative integer")
                })
            }
            Self::MinValue | Self::MaxValue => {
                expect_arity(name, args, 1)?;
                check_bound(name, &args[0])
            }
            Self::Range => {
                if args.is_empty() || args.len() > 2 {
                    return Err(GuardError::invalid_args(
                        name,
                        format!(
                            "expected a minimum and a maximum bound, got {} argument(s)",
                            args.len()
                        ),
                    ));
                }
                let mut supplied = 0;
                for bound in args.iter().filter(|b| !b.is_null()) {
                    check_bound(name, bound)?;
                    supplied += 1;
                }
                if supplied == 0 {
                    return Err(GuardError::invalid_args(
                        name,
                        "at least one bound must be supplied",
                    ));
                }
                Ok(())
            }
            Self::Pattern => {
                expect_arity(name, args, 1)?;
                let Value::String(source) = &args[0] else {
                    return Err(GuardError::invalid_args(name, "pattern must be a string"));
                };
                compiled_pattern(source)
                    .map(|_| ())
                    .map_err(|e| GuardError::InvalidPattern {
                        pattern: source.clone(),
                        reason: e.to_string(),
                    })
            }
            _ => expect_arity(name, args, 0),
        }
    }

    /// Run the validator. Missing or unusable arguments make the
    /// parameterised validators pass; use [`Builtin::check_args`] first.
    pub fn run(self, value: &Value, args: &[Value]) -> Option<ValidationError> {
        match self {
            Self::Integer => integer(value),
            Self::NegativeInteger => negative_integer(value),
            Self::NonNegativeInteger => non_negative_integer(value),
            Self::NonPositiveInteger => non_positive_integer(value),
            Self::PositiveInteger => positive_integer(value),
            Self::Number => number(value),
            Self::NegativeNumber => negative_number(value),
            Self::NonNegativeNumber => non_negative_number(value),
            Self::NonPositiveNumber => non_positive_number(value),
            Self::Email => email(value),
            Self::Url => url(value),
            Self::AbsoluteUrl => absolute_url(value),
            Self::RelativeUrl => relative_url(value),
            Self::Ip => ip(value),
            Self::MinLength => min_length(value, as_length(args.first()?)?),
            Self::MaxLength => max_length(value, as_length(args.first()?)?),
            Self::MinValue => min_value(value, args.first()?),
            Self::MaxValue => max_value(value, args.first()?),
            Self::Range => range(value, supplied(args.first()), supplied(args.get(1))),
            Self::Pattern => pattern(value, args.first()?.as_str()?),
        }
    }
}

fn expect_arity(name: &str, args: &[Value], arity: usize) -> Result<(), GuardError> {
    if args.len() == arity {
        Ok(())
    } else {
        Err(GuardError::invalid_args(
            name,
            format!("expected {} argument(s), got {}", arity, args.len()),
        ))
    }
}

fn check_bound(name: &str, bound: &Value) -> Result<(), GuardError> {
    if bound_as_number(bound).is_some() || bound_as_date(bound).is_some() {
        Ok(())
    } else {
        Err(GuardError::invalid_args(
            name,
            format!("bound must be a number or a date, got {}", bound.type_name()),
        ))
    }
}

fn supplied(arg: Option<&Value>) -> Option<&Value> {
    arg.filter(|v| !v.is_null())
}

// ============================================================================
// Format Validators
// ============================================================================

fn check_grammar(
    value: &Value,
    grammar: &Regex,
    code: &str,
    message: &str,
) -> Option<ValidationError> {
    if grammar.is_match(&value.coerce_str()) {
        None
    } else {
        Some(ValidationError::new(code, message))
    }
}

pub fn integer(value: &Value) -> Option<ValidationError> {
    check_grammar(value, &formats::INTEGER, codes::EINT, "Value must be an integer")
}

pub fn negative_integer(value: &Value) -> Option<ValidationError> {
    check_grammar(
        value,
        &formats::NEGATIVE_INTEGER,
        codes::ENEG,
        "Value must be a negative integer",
    )
}

pub fn non_negative_integer(value: &Value) -> Option<ValidationError> {
    check_grammar(
        value,
        &formats::NON_NEGATIVE_INTEGER,
        codes::ENONNEG,
        "Value must be a non-negative integer",
    )
}

pub fn non_positive_integer(value: &Value) -> Option<ValidationError> {
    check_grammar(
        value,
        &formats::NON_POSITIVE_INTEGER,
        codes::ENONPOS,
        "Value must be a non-positive integer",
    )
}

pub fn positive_integer(value: &Value) -> Option<ValidationError> {
    check_grammar(
        value,
        &formats::POSITIVE_INTEGER,
        codes::EPOS,
        "Value must be a positive integer",
    )
}

pub fn number(value: &Value) -> Option<ValidationError> {
    check_grammar(value, &formats::NUMBER, codes::ENUMBER, "Value must be a number")
}

pub fn negative_number(value: &Value) -> Option<ValidationError> {
    check_grammar(value, &formats::NEGATIVE_NUMBER, codes::ENEG, "Value must be a negative number")
}

pub fn non_negative_number(value: &Value) -> Option<ValidationError> {
    check_grammar(
        value,
        &formats::NON_NEGATIVE_NUMBER,
        codes::ENONNEG,
        "Value must be a non-negative number",
    )
}

pub fn non_positive_number(value: &Value) -> Option<ValidationError> {
    check_grammar(
        value,
        &formats::NON_POSITIVE_NUMBER,
        codes::ENONPOS,
        "Value must be a non-positive number",
    )
}

pub fn email(value: &Value) -> Option<ValidationError> {
    check_grammar(value, &formats::EMAIL, codes::EEMAIL, "Value must be a valid email address")
}

pub fn url(value: &Value) -> Option<ValidationError> {
    check_grammar(value, &formats::URL, codes::EURL, "Value must be a valid URL")
}

pub fn absolute_url(value: &Value) -> Option<ValidationError> {
    check_grammar(value, &formats::ABSOLUTE_URL, codes::EABSURL, "Value must be an absolute URL")
}

pub fn relative_url(value: &Value) -> Option<ValidationError> {
    check_grammar(value, &formats::RELATIVE_URL, codes::ERELURL, "Value must be a relative URL")
}

pub fn ip(value: &Value) -> Option<ValidationError> {
    check_grammar(value, &formats::IPV4, codes::EADDRESS, "Value must be a valid IPv4 address")
}

// ============================================================================
// Length Validators
// ============================================================================

/// Only strings are measured (in characters); any other shape passes.
pub fn min_length(value: &Value, min: usize) -> Option<ValidationError> {
    match value {
        Value::String(s) if s.chars().count() < min => Some(
            ValidationError::new(
                codes::EMINLEN,
                "Value must be at least {minLength} characters long",
            )
            .with_params(ErrorParams::MinLength { min_length: min }),
        ),
        Value::String(_) => None,
        _ => None,
    }
}

/// Only strings are measured (in characters); any other shape passes.
pub fn max_length(value: &Value, max: usize) -> Option<ValidationError> {
    match value {
        Value::String(s) if s.chars().count() > max => Some(
            ValidationError::new(
                codes::EMAXLEN,
                "Value must be at most {maxLength} characters long",
            )
            .with_params(ErrorParams::MaxLength { max_length: max }),
        ),
        Value::String(_) => None,
        _ => None,
    }
}

fn as_length(arg: &Value) -> Option<usize> {
    match arg {
        Value::Int(i) => usize::try_from(*i).ok(),
        Value::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Bound Validators
// ============================================================================

/// Compare a value against a bound.
///
/// Values whose string form matches the `number` grammar are compared
/// numerically; date values are compared relationally against a date bound.
/// Anything else is not comparable and yields `None`, which the bound
/// validators treat as a pass.
fn compare_to_bound(value: &Value, bound: &Value) -> Option<Ordering> {
    if let Some(date) = value.as_date() {
        return Some(date.cmp(&bound_as_date(bound)?));
    }

    let text = value.coerce_str();
    if !formats::NUMBER.is_match(&text) {
        return None;
    }
    let number: f64 = text.parse().ok()?;
    number.partial_cmp(&bound_as_number(bound)?)
}

fn bound_as_number(bound: &Value) -> Option<f64> {
    match bound {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) if !f.is_nan() => Some(*f),
        Value::String(s) if formats::NUMBER.is_match(s) => s.parse().ok(),
        _ => None,
    }
}

/// Date bounds: a date value, an RFC 3339 string, `YYYY-MM-DD` (midnight UTC)
/// or epoch milliseconds.
fn bound_as_date(bound: &Value) -> Option<DateTime<Utc>> {
    match bound {
        Value::Date(d) => Some(*d),
        Value::Int(millis) => DateTime::from_timestamp_millis(*millis),
        Value::String(s) if formats::DATE_ONLY.is_match(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|d| d.with_timezone(&Utc)),
        _ => None,
    }
}

pub fn min_value(value: &Value, min: &Value) -> Option<ValidationError> {
    match compare_to_bound(value, min) {
        Some(Ordering::Less) => Some(
            ValidationError::new(
                codes::EMINVAL,
                "Value must be greater than or equal to {minValue}",
            )
            .with_params(ErrorParams::MinValue {
                min_value: min.clone(),
            }),
        ),
        _ => None,
    }
}

pub fn max_value(value: &Value, max: &Value) -> Option<ValidationError> {
    match compare_to_bound(value, max) {
        Some(Ordering::Greater) => Some(
            ValidationError::new(codes::EMAXVAL, "Value must be less than or equal to {maxValue}")
                .with_params(ErrorParams::MaxValue { max_value: max.clone() }),
        ),
        _ => None,
    }
}

/// Fails with a single `ERANGE` (carrying both bounds) when either supplied
/// bound fails.
pub fn range(value: &Value, min: Option<&Value>, max: Option<&Value>) -> Option<ValidationError> {
    let below = min.is_some_and(|m| min_value(value, m).is_some());
    let above = max.is_some_and(|m| max_value(value, m).is_some());
    if !below && !above {
        return None;
    }

    let message = match (min, max) {
        (Some(_), Some(_)) => "Value must be between {minValue} and {maxValue}",
        (Some(_), None) => "Value must be greater than or equal to {minValue}",
        _ => "Value must be less than or equal to {maxValue}",
    };
    Some(
        ValidationError::new(codes::ERANGE, message).with_params(ErrorParams::Range {
            min_value: min.cloned(),
            max_value: max.cloned(),
        }),
    )
}

// ============================================================================
// Pattern Validator
// ============================================================================

const PATTERN_CACHE_LIMIT: usize = 256;

static PATTERN_CACHE: Lazy<RwLock<HashMap<String, Regex>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Compile (case-insensitively) or fetch a cached pattern
fn compiled_pattern(source: &str) -> Result<Regex, regex::Error> {
    if let Some(re) = PATTERN_CACHE.read().get(source) {
        return Ok(re.clone());
    }

    let re = RegexBuilder::new(source).case_insensitive(true).build()?;
    let mut cache = PATTERN_CACHE.write();
    if cache.len() >= PATTERN_CACHE_LIMIT {
        cache.clear();
    }
    cache.insert(source.to_string(), re.clone());
    Ok(re)
}

/// Fails when the value **matches** `source`.
///
/// This is the opposite polarity of every other built-in. An uncompilable
/// pattern passes here; [`Builtin::check_args`] reports it instead.
pub fn pattern(value: &Value, source: &str) -> Option<ValidationError> {
    let re = compiled_pattern(source).ok()?;
    if re.is_match(&value.coerce_str()) {
        Some(
            ValidationError::new(codes::EREGEXP, "Value must not match {pattern}")
                .with_params(ErrorParams::Pattern {
                    pattern: source.to_string(),
                }),
        )
    } else {
        None
    }
}
