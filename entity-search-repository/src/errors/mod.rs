//! Error types for the entity search repository.
//!
//! `SearchIndexError` covers backend failures. `SearchError` is what the
//! service hands back to callers.

mod search_error;
mod search_index_error;

pub use search_error::SearchError;
pub use search_index_error::SearchIndexError;
