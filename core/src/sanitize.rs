//! Validation and coercion of caller-supplied parameters.
//!
//! # Design
//! Every function is pure: it reads a JSON value and either returns a new,
//! coerced value or fails with a `ValidationError`. No I/O happens here, so
//! endpoints can reject bad input before a request is even built.
//!
//! The `blank` flag marks a field as optional. An optional field that is
//! absent (missing, `null`, empty string or empty array) yields `Ok(None)`,
//! which callers read as "leave the field out of the payload".

use serde_json::Value;
use thiserror::Error;

use crate::payload::Payload;

/// A caller-supplied value failed a field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: value is required")]
    Required { field: String },

    #[error("{field}: expected a positive integer id, got {value}")]
    InvalidId { field: String, value: String },

    #[error("{field}: expected an integer, got {value}")]
    NotInteger { field: String, value: String },

    #[error("{field}: expected a boolean, got {value}")]
    NotBoolean { field: String, value: String },

    #[error("{field}: expected a string, got {value}")]
    NotString { field: String, value: String },

    #[error("{field}: length {length} exceeds the maximum of {max}")]
    TooLong {
        field: String,
        length: usize,
        max: usize,
    },

    #[error("{field}: length {length} is below the minimum of {min}")]
    TooShort {
        field: String,
        length: usize,
        min: usize,
    },
}

/// Accepts a positive integer, or a string holding one.
pub fn sanitize_id(value: impl Into<Value>, name: &str) -> Result<u64, ValidationError> {
    let value = value.into();
    let id = match &value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id > 0)
        .ok_or_else(|| ValidationError::InvalidId {
            field: name.to_string(),
            value: value.to_string(),
        })
}

pub fn sanitize_string_value(
    value: Option<&Value>,
    name: &str,
    max_length: usize,
    min_length: usize,
    blank: bool,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = present(value) else {
        return absent(name, blank);
    };
    let text = as_text(value, name)?;
    check_length(&text, name, Some(max_length), min_length)?;
    Ok(Some(text))
}

pub fn sanitize_integer_value(
    value: Option<&Value>,
    name: &str,
    blank: bool,
) -> Result<Option<i64>, ValidationError> {
    let Some(value) = present(value) else {
        return absent(name, blank);
    };
    as_integer(value)
        .map(Some)
        .ok_or_else(|| ValidationError::NotInteger {
            field: name.to_string(),
            value: value.to_string(),
        })
}

/// Coerces booleans, `0`/`1` and their string forms to `0` or `1`.
pub fn sanitize_bool_integer_value(
    value: Option<&Value>,
    name: &str,
    blank: bool,
) -> Result<Option<i64>, ValidationError> {
    let Some(value) = present(value) else {
        return absent(name, blank);
    };
    let flag = match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(_) => match as_integer(value) {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    };
    flag.map(|flag| Some(i64::from(flag)))
        .ok_or_else(|| ValidationError::NotBoolean {
            field: name.to_string(),
            value: value.to_string(),
        })
}

/// Validates every element as an integer. A scalar counts as a one-element
/// array; an empty array is only allowed for `blank` fields.
pub fn sanitize_integer_array(
    value: Option<&Value>,
    name: &str,
    blank: bool,
) -> Result<Option<Vec<i64>>, ValidationError> {
    let items = as_items(value);
    if items.is_empty() {
        return absent(name, blank);
    }
    items
        .into_iter()
        .map(|item| {
            sanitize_integer_value(Some(item), name, false)?.ok_or_else(|| {
                ValidationError::Required {
                    field: name.to_string(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Validates every element as a string of at most `max_length` characters.
pub fn sanitize_string_array(
    value: Option<&Value>,
    name: &str,
    max_length: Option<usize>,
    blank: bool,
) -> Result<Option<Vec<String>>, ValidationError> {
    let items = as_items(value);
    if items.is_empty() {
        return absent(name, blank);
    }
    let mut sanitized = Vec::with_capacity(items.len());
    for item in items {
        let Some(item) = present(Some(item)) else {
            return Err(ValidationError::Required {
                field: name.to_string(),
            });
        };
        let text = as_text(item, name)?;
        check_length(&text, name, max_length, 0)?;
        sanitized.push(text);
    }
    Ok(Some(sanitized))
}

/// A validator for one payload field, expressed as data so endpoint field
/// tables can be `const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Id,
    String {
        max_length: usize,
        min_length: usize,
        blank: bool,
    },
    Integer {
        blank: bool,
    },
    BoolInteger {
        blank: bool,
    },
    IntegerArray {
        blank: bool,
    },
    StringArray {
        max_length: Option<usize>,
        blank: bool,
    },
}

impl FieldRule {
    pub const fn string(max_length: usize) -> Self {
        FieldRule::String {
            max_length,
            min_length: 0,
            blank: false,
        }
    }

    pub const fn integer() -> Self {
        FieldRule::Integer { blank: false }
    }

    pub const fn bool_integer() -> Self {
        FieldRule::BoolInteger { blank: false }
    }

    pub const fn integer_array() -> Self {
        FieldRule::IntegerArray { blank: false }
    }

    pub const fn string_array(max_length: Option<usize>) -> Self {
        FieldRule::StringArray {
            max_length,
            blank: false,
        }
    }

    /// Only meaningful for `String`; other rules are returned unchanged.
    pub const fn min_length(self, min_length: usize) -> Self {
        match self {
            FieldRule::String {
                max_length, blank, ..
            } => FieldRule::String {
                max_length,
                min_length,
                blank,
            },
            other => other,
        }
    }

    /// Marks the field as optional.
    pub const fn blank(self) -> Self {
        match self {
            FieldRule::Id => FieldRule::Id,
            FieldRule::String {
                max_length,
                min_length,
                ..
            } => FieldRule::String {
                max_length,
                min_length,
                blank: true,
            },
            FieldRule::Integer { .. } => FieldRule::Integer { blank: true },
            FieldRule::BoolInteger { .. } => FieldRule::BoolInteger { blank: true },
            FieldRule::IntegerArray { .. } => FieldRule::IntegerArray { blank: true },
            FieldRule::StringArray { max_length, .. } => FieldRule::StringArray {
                max_length,
                blank: true,
            },
        }
    }

    /// Runs the rule. `Ok(None)` means the field is omitted.
    pub fn apply(&self, value: Option<&Value>, name: &str) -> Result<Option<Value>, ValidationError> {
        Ok(match *self {
            FieldRule::Id => Some(Value::from(sanitize_id(
                value.cloned().unwrap_or(Value::Null),
                name,
            )?)),
            FieldRule::String {
                max_length,
                min_length,
                blank,
            } => sanitize_string_value(value, name, max_length, min_length, blank)?.map(Value::from),
            FieldRule::Integer { blank } => sanitize_integer_value(value, name, blank)?.map(Value::from),
            FieldRule::BoolInteger { blank } => {
                sanitize_bool_integer_value(value, name, blank)?.map(Value::from)
            }
            FieldRule::IntegerArray { blank } => {
                sanitize_integer_array(value, name, blank)?.map(Value::from)
            }
            FieldRule::StringArray { max_length, blank } => {
                sanitize_string_array(value, name, max_length, blank)?.map(Value::from)
            }
        })
    }
}

/// Applies `rules` to the matching keys of `input`.
///
/// Keys without a rule are dropped, rules without a key are skipped, and the
/// first invalid field (in table order) aborts with its error.
pub fn sanitize_fields(
    rules: &[(&str, FieldRule)],
    input: &Payload,
) -> Result<Payload, ValidationError> {
    let mut sanitized = Payload::new();
    for (name, rule) in rules {
        let Some(value) = input.get(*name) else {
            continue;
        };
        if let Some(value) = rule.apply(Some(value), name)? {
            sanitized.insert((*name).to_string(), value);
        }
    }
    Ok(sanitized)
}

/// Reads an integer from a JSON number or a numeric string.
pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !is_absent(Some(value)))
}

fn absent<T>(name: &str, blank: bool) -> Result<Option<T>, ValidationError> {
    if blank {
        Ok(None)
    } else {
        Err(ValidationError::Required {
            field: name.to_string(),
        })
    }
}

fn as_text(value: &Value, name: &str) -> Result<String, ValidationError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(ValidationError::NotString {
            field: name.to_string(),
            value: other.to_string(),
        }),
    }
}

fn as_items(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(scalar) => vec![scalar],
    }
}

fn check_length(
    text: &str,
    name: &str,
    max_length: Option<usize>,
    min_length: usize,
) -> Result<(), ValidationError> {
    let length = text.chars().count();
    if let Some(max) = max_length.filter(|max| length > *max) {
        return Err(ValidationError::TooLong {
            field: name.to_string(),
            length,
            max,
        });
    }
    if length < min_length {
        return Err(ValidationError::TooShort {
            field: name.to_string(),
            length,
            min: min_length,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn sanitize_id_accepts_positive_integers() {
        for n in [1_u64, 2, 42, 1_000_000, u64::from(u32::MAX), i64::MAX as u64 + 1, u64::MAX] {
            assert_eq!(sanitize_id(n, "id").unwrap(), n);
        }
        assert_eq!(sanitize_id(u64::MAX.to_string(), "id").unwrap(), u64::MAX);
        assert_eq!(sanitize_id("17", "id").unwrap(), 17);
        assert_eq!(sanitize_id(" 8 ", "id").unwrap(), 8);
    }

    #[test]
    fn sanitize_id_rejects_non_positive_and_non_numeric() {
        for value in [json!(0), json!(-1), json!("abc"), json!(""), json!(null), json!(1.5), json!([1])] {
            let err = sanitize_id(value, "website_id").unwrap_err();
            assert!(matches!(err, ValidationError::InvalidId { ref field, .. } if field == "website_id"));
        }
    }

    #[test]
    fn string_value_enforces_length_bounds() {
        let value = json!("abc");
        assert_eq!(
            sanitize_string_value(Some(&value), "name", 3, 0, false).unwrap(),
            Some("abc".to_string())
        );
        assert!(matches!(
            sanitize_string_value(Some(&value), "name", 2, 0, false),
            Err(ValidationError::TooLong { length: 3, max: 2, .. })
        ));
        assert!(matches!(
            sanitize_string_value(Some(&value), "name", 10, 5, false),
            Err(ValidationError::TooShort { length: 3, min: 5, .. })
        ));
    }

    #[test]
    fn string_value_counts_characters_not_bytes() {
        let value = json!("привет");
        assert!(sanitize_string_value(Some(&value), "name", 6, 0, false).is_ok());
    }

    #[test]
    fn string_value_blank_omits_absent_field() {
        assert_eq!(sanitize_string_value(None, "name", 10, 0, true).unwrap(), None);
        assert_eq!(
            sanitize_string_value(Some(&json!("")), "name", 10, 0, true).unwrap(),
            None
        );
        assert!(matches!(
            sanitize_string_value(None, "name", 10, 0, false),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            sanitize_string_value(Some(&json!({"a": 1})), "name", 10, 0, false),
            Err(ValidationError::NotString { .. })
        ));
    }

    #[test]
    fn integer_value_coerces_numeric_strings() {
        assert_eq!(sanitize_integer_value(Some(&json!("12")), "adservice", false).unwrap(), Some(12));
        assert_eq!(sanitize_integer_value(Some(&json!(-3)), "adservice", false).unwrap(), Some(-3));
        assert_eq!(sanitize_integer_value(None, "adservice", true).unwrap(), None);
        assert!(matches!(
            sanitize_integer_value(Some(&json!("x")), "adservice", true),
            Err(ValidationError::NotInteger { .. })
        ));
    }

    #[test]
    fn bool_integer_value_maps_to_zero_or_one() {
        assert_eq!(sanitize_bool_integer_value(Some(&json!(true)), "m", false).unwrap(), Some(1));
        assert_eq!(sanitize_bool_integer_value(Some(&json!(false)), "m", false).unwrap(), Some(0));
        assert_eq!(sanitize_bool_integer_value(Some(&json!(1)), "m", false).unwrap(), Some(1));
        assert_eq!(sanitize_bool_integer_value(Some(&json!("0")), "m", false).unwrap(), Some(0));
        assert_eq!(sanitize_bool_integer_value(None, "m", true).unwrap(), None);
        assert!(matches!(
            sanitize_bool_integer_value(Some(&json!(2)), "m", true),
            Err(ValidationError::NotBoolean { .. })
        ));
    }

    #[test]
    fn integer_array_validates_each_element() {
        assert_eq!(
            sanitize_integer_array(Some(&json!([1, "2", 3])), "categories", false).unwrap(),
            Some(vec![1, 2, 3])
        );
        assert_eq!(
            sanitize_integer_array(Some(&json!(7)), "categories", false).unwrap(),
            Some(vec![7])
        );
        assert!(matches!(
            sanitize_integer_array(Some(&json!([1, "x"])), "categories", false),
            Err(ValidationError::NotInteger { .. })
        ));
    }

    #[test]
    fn empty_arrays_are_only_allowed_when_blank() {
        assert_eq!(sanitize_integer_array(Some(&json!([])), "categories", true).unwrap(), None);
        assert!(matches!(
            sanitize_integer_array(Some(&json!([])), "categories", false),
            Err(ValidationError::Required { .. })
        ));
        assert_eq!(sanitize_string_array(Some(&json!([])), "regions", Some(2), true).unwrap(), None);
        assert!(matches!(
            sanitize_string_array(None, "regions", Some(2), false),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn string_array_checks_element_length() {
        assert_eq!(
            sanitize_string_array(Some(&json!(["RU", "DE"])), "regions", Some(2), false).unwrap(),
            Some(vec!["RU".to_string(), "DE".to_string()])
        );
        assert!(matches!(
            sanitize_string_array(Some(&json!(["RU", "USA"])), "regions", Some(2), false),
            Err(ValidationError::TooLong { length: 3, .. })
        ));
        assert!(sanitize_string_array(Some(&json!(["anything long"])), "region", None, false).is_ok());
    }

    #[test]
    fn sanitize_fields_only_emits_present_fields() {
        const RULES: &[(&str, FieldRule)] = &[
            ("name", FieldRule::string(200)),
            ("kind", FieldRule::string(20)),
            ("adservice", FieldRule::integer().blank()),
            ("mailing_targeting", FieldRule::bool_integer().blank()),
        ];
        let input = payload(json!({
            "name": "Foo",
            "mailing_targeting": true,
            "adservice": null,
            "unknown": "dropped",
        }));

        let sanitized = sanitize_fields(RULES, &input).unwrap();
        assert_eq!(
            Value::Object(sanitized),
            json!({"name": "Foo", "mailing_targeting": 1})
        );
    }

    #[test]
    fn sanitize_fields_fails_on_first_invalid_field() {
        const RULES: &[(&str, FieldRule)] = &[
            ("name", FieldRule::string(3)),
            ("description", FieldRule::string(20_000).min_length(100)),
        ];
        let input = payload(json!({"name": "too long", "description": "short"}));

        let err = sanitize_fields(RULES, &input).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { ref field, .. } if field == "name"));
    }

    #[test]
    fn sanitize_fields_does_not_mutate_input() {
        const RULES: &[(&str, FieldRule)] = &[("categories", FieldRule::integer_array())];
        let input = payload(json!({"categories": ["1", "2"]}));
        let before = input.clone();

        let sanitized = sanitize_fields(RULES, &input).unwrap();
        assert_eq!(input, before);
        assert_eq!(sanitized["categories"], json!([1, 2]));
    }

    #[test]
    fn field_rule_modifiers_preserve_other_settings() {
        let rule = FieldRule::string(20_000).min_length(100).blank();
        assert_eq!(
            rule,
            FieldRule::String {
                max_length: 20_000,
                min_length: 100,
                blank: true
            }
        );
        assert_eq!(FieldRule::integer().min_length(5), FieldRule::Integer { blank: false });
    }
}
