//! Query building for record listings
//!
//! Filters and sort clauses are built as values and rendered to the store's
//! string syntax at the HTTP boundary.

pub mod filters;
pub mod orderby;
pub mod query;

pub use filters::Filter;
pub use orderby::OrderBy;
pub use query::ListQuery;
