//! Filter expressions for record listing
//!
//! Filters are built structurally and rendered to the store's string syntax
//! (`name = "Zhang" && date >= "2024-12-01"`) only at the HTTP boundary.
//! The in-memory store evaluates the structure directly.

use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

/// A comparable value on the right-hand side of a filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl FilterValue {
    /// Render as a filter literal, quoting and escaping strings
    pub fn to_literal(&self) -> String {
        match self {
            FilterValue::String(s) => {
                let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
            FilterValue::Int(i) => i.to_string(),
            FilterValue::Float(f) => f.to_string(),
            FilterValue::Bool(b) => b.to_string(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FilterValue::String(s) => Value::String(s.clone()),
            FilterValue::Int(i) => Value::from(*i),
            FilterValue::Float(f) => Value::from(*f),
            FilterValue::Bool(b) => Value::Bool(*b),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        FilterValue::Int(i)
    }
}

impl From<f64> for FilterValue {
    fn from(f: f64) -> Self {
        FilterValue::Float(f)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

/// Filter expression over record fields
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, FilterValue),
    Gte(String, FilterValue),
    Lte(String, FilterValue),
    Lt(String, FilterValue),
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Filter::Gte(field.into(), value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Filter::Lte(field.into(), value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    /// Conjunction; nested conjunctions are flattened
    pub fn and(filters: Vec<Filter>) -> Self {
        let mut flat = Vec::with_capacity(filters.len());
        for filter in filters {
            match filter {
                Filter::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Filter::And(flat)
    }

    /// Evaluate against a record's field map
    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        match self {
            Filter::Eq(field, value) => {
                let actual = fields.get(field).unwrap_or(&Value::Null);
                values_equal(actual, &value.to_json())
            }
            Filter::Gte(field, value) => {
                compare_field(fields, field, value).is_some_and(|o| o != Ordering::Less)
            }
            Filter::Lte(field, value) => {
                compare_field(fields, field, value).is_some_and(|o| o != Ordering::Greater)
            }
            Filter::Lt(field, value) => {
                compare_field(fields, field, value) == Some(Ordering::Less)
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(fields)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Eq(field, value) => write!(f, "{} = {}", field, value.to_literal()),
            Filter::Gte(field, value) => write!(f, "{} >= {}", field, value.to_literal()),
            Filter::Lte(field, value) => write!(f, "{} <= {}", field, value.to_literal()),
            Filter::Lt(field, value) => write!(f, "{} < {}", field, value.to_literal()),
            Filter::And(filters) => {
                let parts: Vec<String> = filters.iter().map(|p| p.to_string()).collect();
                write!(f, "{}", parts.join(" && "))
            }
        }
    }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => actual == expected,
    }
}

fn compare_field(fields: &Map<String, Value>, field: &str, value: &FilterValue) -> Option<Ordering> {
    let actual = fields.get(field)?;
    match (actual, value.to_json()) {
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        _ => None,
    }
}
