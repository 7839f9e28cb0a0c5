//! Record store abstraction
//!
//! A keyed collection service with create, update-by-id, delete-by-id and
//! filtered listing. No transactional guarantee spans calls.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::models::{Session, StoredRecord};
use super::query::{Filter, ListQuery};

/// Failure reported by a record store call
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No record matched (get_first, update/delete of an unknown id)
    NotFound,
    /// Credentials missing, expired or insufficient
    Unauthorized,
    /// Server rejected the request
    Rejected { status: u16, message: String },
    /// Network-level failure before a response arrived
    Transport(String),
    /// Response body could not be decoded
    Decode(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::Unauthorized => write!(f, "not authorized"),
            StoreError::Rejected { status, message } => {
                write!(f, "store rejected request ({}): {}", status, message)
            }
            StoreError::Transport(msg) => write!(f, "store unreachable: {}", msg),
            StoreError::Decode(msg) => write!(f, "invalid store response: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the reconciler needs from the external record store
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record, returning the assigned id
    async fn create(
        &self,
        session: &Session,
        collection: &str,
        data: &Map<String, Value>,
    ) -> StoreResult<String>;

    /// Overwrite the given fields of an existing record
    async fn update_by_id(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> StoreResult<()>;

    async fn delete_by_id(&self, session: &Session, collection: &str, id: &str) -> StoreResult<()>;

    /// Every record matching the query, in the requested order
    async fn list_full(
        &self,
        session: &Session,
        collection: &str,
        query: &ListQuery,
    ) -> StoreResult<Vec<StoredRecord>>;

    /// First record matching the filter, `StoreError::NotFound` when none does
    async fn get_first(
        &self,
        session: &Session,
        collection: &str,
        filter: &Filter,
    ) -> StoreResult<StoredRecord>;
}
