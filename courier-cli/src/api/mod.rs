//! Record store API
//!
//! The dashboard keeps every record in an external backend-as-a-service.
//! This module provides the `RecordStore` seam the import pipeline writes
//! through, an HTTP client for the real service, an in-process store for
//! dry runs and tests, password auth, and the filter/sort query builders.

pub mod auth;
pub mod client;
pub mod memory;
pub mod models;
pub mod operations;
pub mod query;
pub mod store;

pub use auth::AuthManager;
pub use client::HttpRecordStore;
pub use memory::InMemoryStore;
pub use models::{Session, StoredRecord};
pub use operations::{Operation, OperationOutcome};
pub use query::{Filter, ListQuery, OrderBy};
pub use store::{RecordStore, StoreError};
