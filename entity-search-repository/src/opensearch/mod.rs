//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend.

mod index_config;
mod provider;
mod query_translator;

pub use index_config::{get_index_settings, KEYWORD_SUFFIX};
pub use provider::OpenSearchProvider;
pub use query_translator::{search_body, to_query_string};
