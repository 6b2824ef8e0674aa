use std::fmt;

use entity_search_shared::{Entity, Sort};

use super::SearchRequest;

/// Chooses the direction of a sort on one field.
#[must_use = "a sort is only added by `ascending()` or `descending()`"]
pub struct SortOperation<E> {
    request: SearchRequest<E>,
    field: String,
}

impl<E: Entity> SortOperation<E> {
    pub(crate) fn new(request: SearchRequest<E>, field: String) -> Self {
        Self { request, field }
    }

    pub fn ascending(self) -> SearchRequest<E> {
        self.request.push_sort(Sort::ascending(self.field))
    }

    pub fn descending(self) -> SearchRequest<E> {
        self.request.push_sort(Sort::descending(self.field))
    }
}

impl<E: Entity> fmt::Debug for SortOperation<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortOperation")
            .field("request", &self.request.to_string())
            .field("field", &self.field)
            .finish()
    }
}
