//! Errors surfaced by the search index service to its callers.

use thiserror::Error;

use super::SearchIndexError;

/// Errors from indexing, removing and querying entities.
///
/// Document build failures are returned immediately by the call that builds
/// the document. Backend failures are deferred until the pending operation or
/// result is awaited.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// A field value could not be converted into an indexed field.
    #[error("Cannot index field '{field}' of {kind} {id} (value {value}): {reason}")]
    DocumentBuild {
        kind: String,
        id: String,
        field: String,
        value: String,
        reason: String,
    },

    /// Waiting on a query failed.
    #[error("Query failed: {0}")]
    Query(#[source] SearchIndexError),

    /// Waiting on a document write or delete failed.
    #[error("Index operation failed: {0}")]
    Index(#[source] SearchIndexError),

    /// An index sweep stopped part way through.
    #[error("Removing all documents stopped after {removed} removals: {source}")]
    RemoveAll {
        removed: usize,
        #[source]
        source: SearchIndexError,
    },
}

impl SearchError {
    /// Create a document build error.
    pub fn document_build(
        kind: impl Into<String>,
        id: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DocumentBuild {
            kind: kind.into(),
            id: id.into(),
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// The backend error behind this failure, if any.
    pub fn backend_error(&self) -> Option<&SearchIndexError> {
        match self {
            SearchError::DocumentBuild { .. } => None,
            SearchError::Query(e) | SearchError::Index(e) => Some(e),
            SearchError::RemoveAll { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_build_message() {
        let err = SearchError::document_build("Product", "7", "price", "NaN", "not a finite number");
        assert_eq!(
            err.to_string(),
            "Cannot index field 'price' of Product 7 (value NaN): not a finite number"
        );
        assert!(err.backend_error().is_none());
    }

    #[test]
    fn test_remove_all_keeps_progress() {
        let err = SearchError::RemoveAll {
            removed: 400,
            source: SearchIndexError::delete("boom"),
        };
        assert!(err.to_string().contains("after 400 removals"));
        assert!(matches!(
            err.backend_error(),
            Some(SearchIndexError::DeleteError(_))
        ));
    }
}
