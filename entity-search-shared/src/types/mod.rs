//! Core data structures shared across the entity search workspace.

pub mod document;
pub mod entity;
pub mod search_query;
pub mod search_result;
pub mod value;
