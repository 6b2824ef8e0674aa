//! # Entity Search Shared
//!
//! This crate defines the data structures shared between the entity repository
//! and the search index layer: entity values and field accessors, indexed
//! documents, the query clause tree and the result types returned by search
//! backends.

pub mod types;

pub use types::document::{Document, DocumentField, FieldValue};
pub use types::entity::{Entity, FieldAccessor, FieldAccessors, FieldKind};
pub use types::search_query::{
    encode_field_name, format_date, format_number, quote, DocumentQuery, Number, Operand,
    Operator, QueryClause, RangeRequest, SearchValue, Sort, SortDefault, SortDirection,
    SortExpression,
};
pub use types::search_result::{QueryResults, RangePage};
pub use types::value::{GeoPoint, Value};
