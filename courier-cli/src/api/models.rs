//! Shared models for the record store API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request-scoped credential handed to every store call.
///
/// There is no process-wide auth state: callers authenticate once, keep the
/// returned `Session` for the duration of their work and pass it explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token issued by the auth collection, `None` for anonymous access
    pub token: Option<String>,
    /// Identity of the authenticated user (username or email)
    pub user: Option<String>,
}

impl Session {
    /// Build a session from an issued token
    pub fn authenticated(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user.into()),
        }
    }

    /// Session without credentials (in-memory store, public collections)
    pub fn anonymous() -> Self {
        Self {
            token: None,
            user: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A record as held by the store: server-assigned id plus its field map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StoredRecord {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// String value of a field, if present and a string
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_authenticated() {
        assert!(Session::authenticated("tok", "admin").is_authenticated());
        assert!(!Session::anonymous().is_authenticated());
        assert!(!Session::authenticated("", "admin").is_authenticated());
    }

    #[test]
    fn test_stored_record_flattens_fields() {
        let record: StoredRecord = serde_json::from_value(json!({
            "id": "abc123",
            "name": "Zhang",
            "date": "2024-12-01",
            "weight": 12.5
        }))
        .unwrap();

        assert_eq!(record.id, "abc123");
        assert_eq!(record.str_field("name"), Some("Zhang"));
        assert_eq!(record.fields["weight"], json!(12.5));
        assert!(!record.fields.contains_key("id"));
    }
}
