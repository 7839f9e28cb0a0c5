//! Sort clauses for record listing

use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

/// A single sort key; renders as `field` or `-field`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    Asc(String),
    Desc(String),
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy::Asc(field.into())
    }

    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy::Desc(field.into())
    }

    pub fn field(&self) -> &str {
        match self {
            OrderBy::Asc(field) | OrderBy::Desc(field) => field,
        }
    }

    /// Compare two records by this key; nulls sort first ascending
    pub fn compare(&self, a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
        let ordering = compare_values(a.get(self.field()), b.get(self.field()));
        match self {
            OrderBy::Asc(_) => ordering,
            OrderBy::Desc(_) => ordering.reverse(),
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBy::Asc(field) => write!(f, "{}", field),
            OrderBy::Desc(field) => write!(f, "-{}", field),
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render() {
        assert_eq!(OrderBy::desc("date").to_string(), "-date");
        assert_eq!(OrderBy::asc("date").to_string(), "date");
    }

    #[test]
    fn test_compare_desc_dates() {
        let a = json!({"date": "2024-12-01"});
        let b = json!({"date": "2024-12-02"});
        let (Value::Object(a), Value::Object(b)) = (a, b) else {
            unreachable!()
        };
        assert_eq!(OrderBy::desc("date").compare(&a, &b), Ordering::Greater);
        assert_eq!(OrderBy::asc("date").compare(&a, &b), Ordering::Less);
    }
}
