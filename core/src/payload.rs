//! Payload shaping: pagination, filtering, ordering and wire encoding.
//!
//! # Design
//! A payload is a flat JSON object. Each policy below turns caller input into
//! a partial payload that the request builder merges into the staged one, so
//! endpoints compose them freely. Encoding to `application/x-www-form-urlencoded`
//! happens last, after `prepare_data` has dropped `null` items from sequences.

use std::fmt;

use serde_json::{Map, Value};

use crate::constants::{DEFAULT_PAGINATION_LIMIT, DEFAULT_PAGINATION_OFFSET, MAX_PAGINATION_LIMIT};
use crate::sanitize::as_integer;

/// Field name to value mapping sent as query string or request body.
pub type Payload = Map<String, Value>;

/// Requested page window. Out-of-range values fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self { limit, offset }
    }

    /// Picks `limit` and `offset` out of caller input. Non-numeric values
    /// count as missing.
    pub fn from_payload(input: &Payload) -> Self {
        Self {
            limit: input.get("limit").and_then(as_integer),
            offset: input.get("offset").and_then(as_integer),
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .filter(|limit| (1..=MAX_PAGINATION_LIMIT).contains(limit))
            .unwrap_or(DEFAULT_PAGINATION_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset
            .filter(|offset| *offset >= 0)
            .unwrap_or(DEFAULT_PAGINATION_OFFSET)
    }

    /// Always emits both fields.
    pub fn to_payload(&self) -> Payload {
        let mut data = Payload::new();
        data.insert("limit".to_string(), Value::from(self.limit()));
        data.insert("offset".to_string(), Value::from(self.offset()));
        data
    }
}

/// Transforms an allowed filter value; `None` suppresses the field.
pub type FilterFn = Box<dyn Fn(&Value) -> Option<Value>>;

/// Caller filters plus the allow-list of fields an endpoint accepts.
pub struct Filtering {
    filter_by: Payload,
    available: Vec<(String, FilterFn)>,
}

impl Filtering {
    pub fn new(filter_by: Payload) -> Self {
        Self {
            filter_by,
            available: Vec::new(),
        }
    }

    pub fn allow<F>(mut self, field: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + 'static,
    {
        self.available.push((field.into(), Box::new(validator)));
        self
    }

    pub fn to_payload(&self) -> Payload {
        let mut data = Payload::new();
        for (key, value) in &self.filter_by {
            let Some((_, validator)) = self.available.iter().find(|(field, _)| field == key) else {
                continue;
            };
            if let Some(value) = validator(value) {
                data.insert(key.clone(), value);
            }
        }
        data
    }
}

impl fmt::Debug for Filtering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filtering")
            .field("filter_by", &self.filter_by)
            .field(
                "available",
                &self.available.iter().map(|(field, _)| field).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Filter validator accepting only the listed string values.
pub fn one_of(allowed: &'static [&'static str]) -> impl Fn(&Value) -> Option<Value> {
    move |value| {
        value
            .as_str()
            .filter(|value| allowed.contains(value))
            .map(Value::from)
    }
}

/// Filter validator accepting anything that reads as an integer.
pub fn integer(value: &Value) -> Option<Value> {
    as_integer(value).map(Value::from)
}

/// Filter validator forwarding non-empty strings unchanged.
pub fn text(value: &Value) -> Option<Value> {
    value
        .as_str()
        .filter(|value| !value.is_empty())
        .map(Value::from)
}

/// Requested sort fields, `-` prefixed for descending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ordering {
    order_by: Vec<String>,
    available: Vec<String>,
}

impl Ordering {
    pub fn new<I, S>(order_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order_by: order_by.into_iter().map(Into::into).collect(),
            available: Vec::new(),
        }
    }

    /// Reads `order_by` from caller input, as a single string or an array.
    pub fn from_payload(input: &Payload) -> Self {
        let order_by = match input.get("order_by") {
            Some(Value::String(field)) => vec![field.clone()],
            Some(Value::Array(fields)) => fields
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        Self::new(order_by)
    }

    pub fn allow<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Emits `order_by` with the allow-listed entries, in request order.
    pub fn to_payload(&self) -> Payload {
        let order_by = self
            .order_by
            .iter()
            .filter(|field| {
                let name = field.strip_prefix('-').unwrap_or(field.as_str());
                !name.is_empty() && self.available.iter().any(|allowed| allowed == name)
            })
            .cloned()
            .map(Value::from)
            .collect();

        let mut data = Payload::new();
        data.insert("order_by".to_string(), Value::Array(order_by));
        data
    }
}

/// Drops `null` items from sequences. Top-level `null`s stay so update calls
/// can clear a field.
pub fn prepare_data(data: &Payload) -> Payload {
    data.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Array(items) => {
                    Value::Array(items.iter().filter(|item| !item.is_null()).cloned().collect())
                }
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Flattens a payload into form pairs; sequences become repeated keys.
pub fn form_pairs(data: &Payload) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(data.len());
    for (key, value) in data {
        match value {
            Value::Array(items) => {
                pairs.extend(items.iter().map(|item| (key.clone(), form_value(item))));
            }
            other => pairs.push((key.clone(), form_value(other))),
        }
    }
    pairs
}

pub fn encode_form(pairs: &[(String, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn form_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        nested => nested.to_string(),
    }
}
