//! Core Operation types for record store mutations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::models::Session;
use crate::api::store::{RecordStore, StoreResult};

/// A single mutation against a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Insert a new record
    Create {
        /// Collection name (e.g., "performance", "daily_performance")
        collection: String,
        /// Full field set of the new record
        data: Map<String, Value>,
    },
    /// Overwrite an existing record's fields
    Update {
        collection: String,
        /// Store-assigned record id
        id: String,
        data: Map<String, Value>,
    },
    /// Remove a record
    Delete { collection: String, id: String },
}

/// What an executed operation did, with the affected record id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationOutcome {
    Created { id: String },
    Updated { id: String },
    Deleted { id: String },
}

impl Operation {
    pub fn create(collection: impl Into<String>, data: Map<String, Value>) -> Self {
        Self::Create {
            collection: collection.into(),
            data,
        }
    }

    pub fn update(collection: impl Into<String>, id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self::Update {
            collection: collection.into(),
            id: id.into(),
            data,
        }
    }

    pub fn delete(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Delete {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            Self::Create { collection, .. } => collection,
            Self::Update { collection, .. } => collection,
            Self::Delete { collection, .. } => collection,
        }
    }

    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    /// Execute this operation against a store with the caller's session
    pub async fn execute(
        &self,
        store: &dyn RecordStore,
        session: &Session,
    ) -> StoreResult<OperationOutcome> {
        match self {
            Self::Create { collection, data } => {
                let id = store.create(session, collection, data).await?;
                Ok(OperationOutcome::Created { id })
            }
            Self::Update {
                collection,
                id,
                data,
            } => {
                store.update_by_id(session, collection, id, data).await?;
                Ok(OperationOutcome::Updated { id: id.clone() })
            }
            Self::Delete { collection, id } => {
                store.delete_by_id(session, collection, id).await?;
                Ok(OperationOutcome::Deleted { id: id.clone() })
            }
        }
    }
}

impl OperationOutcome {
    pub fn id(&self) -> &str {
        match self {
            Self::Created { id } | Self::Updated { id } | Self::Deleted { id } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::InMemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_execute_create_then_delete() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        let Value::Object(data) = json!({"name": "Zhang"}) else {
            unreachable!()
        };

        let created = Operation::create("performance", data)
            .execute(&store, &session)
            .await
            .unwrap();
        assert!(matches!(created, OperationOutcome::Created { .. }));
        assert_eq!(store.len("performance").await, 1);

        let deleted = Operation::delete("performance", created.id())
            .execute(&store, &session)
            .await
            .unwrap();
        assert_eq!(deleted.id(), created.id());
        assert_eq!(store.len("performance").await, 0);
    }

    #[test]
    fn test_operation_type() {
        assert_eq!(Operation::delete("performance", "x").operation_type(), "delete");
        assert_eq!(Operation::delete("performance", "x").collection(), "performance");
    }
}
