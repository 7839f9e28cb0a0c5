//! Reusable list query (filter + sort + field projection)

use super::{Filter, OrderBy};

/// Parameters for a full listing of a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: Option<Filter>,
    pub sort: Vec<OrderBy>,
    /// Restrict returned fields; `None` returns every field
    pub fields: Option<Vec<String>>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort(mut self, order: OrderBy) -> Self {
        self.sort.push(order);
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Rendered filter string, if any
    pub fn filter_string(&self) -> Option<String> {
        self.filter.as_ref().map(|f| f.to_string())
    }

    /// Rendered sort string (`-date,name`), if any
    pub fn sort_string(&self) -> Option<String> {
        if self.sort.is_empty() {
            return None;
        }
        Some(
            self.sort
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    pub fn fields_string(&self) -> Option<String> {
        self.fields.as_ref().map(|f| f.join(","))
    }
}
