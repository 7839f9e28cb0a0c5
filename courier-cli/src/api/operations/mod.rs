//! Record store mutations
//!
//! Every write the reconciler issues is expressed as an `Operation` value and
//! executed one at a time against a `RecordStore`.

pub mod operation;

pub use operation::{Operation, OperationOutcome};
