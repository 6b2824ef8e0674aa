//! Fluent search requests and their results.
//!
//! A [`SearchRequest`] is a consuming builder. [`SearchRequest::field`] and
//! [`SearchRequest::order`] move the request into a [`FieldOperation`] or
//! [`SortOperation`], whose methods append a clause and hand the request
//! back.

mod field_operation;
mod request;
mod result;
mod sort_operation;

pub use field_operation::FieldOperation;
pub use request::SearchRequest;
pub use result::SearchResult;
pub use sort_operation::SortOperation;
