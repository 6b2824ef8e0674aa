//! # Entity Search Repository
//!
//! This crate keeps entity documents in a search index and queries them. It
//! includes the provider abstraction with OpenSearch and in-memory backends,
//! the `SearchIndexService` that projects entities into documents, and the
//! fluent `SearchRequest` builder.

pub mod config;
mod document_builder;
pub mod errors;
mod index_operation;
pub mod interfaces;
pub mod memory;
mod numeric_cache;
pub mod opensearch;
pub mod search;
pub mod service;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::SearchIndexServiceConfig;
pub use document_builder::{build_document, to_field_value};
pub use errors::{SearchError, SearchIndexError};
pub use index_operation::IndexOperation;
pub use interfaces::SearchIndexProvider;
pub use memory::MemorySearchProvider;
pub use numeric_cache::NumericFieldCache;
pub use opensearch::OpenSearchProvider;
pub use search::{FieldOperation, SearchRequest, SearchResult, SortOperation};
pub use service::SearchIndexService;
pub use utils::{id_to_string, parse_entity_id, parse_entity_ids};
