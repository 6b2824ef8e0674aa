//! In-process implementation of the search index provider.
//!
//! Evaluates the clause tree directly against stored documents. Used by tests
//! and for local runs without an OpenSearch node.

mod matcher;
mod provider;

pub use provider::{MemorySearchProvider, DEFAULT_QUERY_LIMIT};
