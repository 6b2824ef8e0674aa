//! Query types for the search index.
//!
//! Field filters are kept as a small clause tree ([`QueryClause`]) rather than
//! as strings. [`QueryClause::render`] produces the canonical fragment syntax
//! (`price>=15.5`, `name:("a" OR "b")`); backends are free to translate the
//! tree into their own dialect instead.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Rewrites a property path into the form used for index field names.
///
/// The mapping is one-way: `a.b` and a field literally named `a_b` share the
/// same index name.
pub fn encode_field_name(name: &str) -> String {
    name.replace('.', "_")
}

/// Wraps text in double quotes, escaping embedded quotes.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// Fixed decimal rendering with at most ten fraction digits and no trailing zeros.
pub fn format_number(number: Number) -> String {
    match number {
        Number::Integer(i) => i.to_string(),
        Number::Float(f) if !f.is_finite() => f.to_string(),
        Number::Float(f) => {
            let fixed = format!("{f:.10}");
            let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
            if trimmed == "-0" {
                "0".to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Comparison operators understood by the search engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Token match.
    Is,
    /// Exact phrase match.
    Equals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
}

impl Operator {
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Is => ":",
            Operator::Equals => "=",
            Operator::LessThan => "<",
            Operator::LessThanEquals => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanEquals => ">=",
        }
    }

    pub fn is_range(&self) -> bool {
        !matches!(self, Operator::Is | Operator::Equals)
    }
}

/// A numeric operand, keeping integers exact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_number(*self))
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(value.into())
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::Integer(value.into())
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(value.into())
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// A typed operand for a field operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SearchValue {
    Text(String),
    Number(Number),
    Date(NaiveDate),
}

impl SearchValue {
    /// Operand form: text quoted, numbers and dates bare.
    pub fn render(&self) -> String {
        match self {
            SearchValue::Text(text) => quote(text),
            SearchValue::Number(number) => format_number(*number),
            SearchValue::Date(date) => format_date(date),
        }
    }
}

impl From<&str> for SearchValue {
    fn from(value: &str) -> Self {
        SearchValue::Text(value.to_string())
    }
}

impl From<String> for SearchValue {
    fn from(value: String) -> Self {
        SearchValue::Text(value)
    }
}

impl From<&String> for SearchValue {
    fn from(value: &String) -> Self {
        SearchValue::Text(value.clone())
    }
}

impl From<Number> for SearchValue {
    fn from(value: Number) -> Self {
        SearchValue::Number(value)
    }
}

impl From<i32> for SearchValue {
    fn from(value: i32) -> Self {
        SearchValue::Number(value.into())
    }
}

impl From<i64> for SearchValue {
    fn from(value: i64) -> Self {
        SearchValue::Number(value.into())
    }
}

impl From<u32> for SearchValue {
    fn from(value: u32) -> Self {
        SearchValue::Number(value.into())
    }
}

impl From<f32> for SearchValue {
    fn from(value: f32) -> Self {
        SearchValue::Number(value.into())
    }
}

impl From<f64> for SearchValue {
    fn from(value: f64) -> Self {
        SearchValue::Number(value.into())
    }
}

impl From<NaiveDate> for SearchValue {
    fn from(value: NaiveDate) -> Self {
        SearchValue::Date(value)
    }
}

impl From<DateTime<Utc>> for SearchValue {
    fn from(value: DateTime<Utc>) -> Self {
        SearchValue::Date(value.date_naive())
    }
}

/// Right-hand side of a field clause.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Operand {
    /// Unquoted search tokens, rendered as `(tokens)`.
    Tokens(String),
    Value(SearchValue),
    /// Alternatives, rendered as `(a OR b)`.
    AnyOf(Vec<SearchValue>),
}

impl Operand {
    pub fn render(&self) -> String {
        match self {
            Operand::Tokens(tokens) => format!("({tokens})"),
            Operand::Value(value) => value.render(),
            Operand::AnyOf(values) => {
                let rendered: Vec<String> = values.iter().map(SearchValue::render).collect();
                format!("({})", rendered.join(" OR "))
            }
        }
    }
}

/// One query fragment. Fragments in a request are ANDed together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum QueryClause {
    /// Free text passed through to the engine as-is.
    Raw(String),
    Field {
        field: String,
        operator: Operator,
        operand: Operand,
    },
}

impl QueryClause {
    pub fn field(field: impl Into<String>, operator: Operator, operand: Operand) -> Self {
        QueryClause::Field {
            field: field.into(),
            operator,
            operand,
        }
    }

    pub fn render(&self) -> String {
        match self {
            QueryClause::Raw(text) => text.clone(),
            QueryClause::Field {
                field,
                operator,
                operand,
            } => format!("{}{}{}", field, operator.token(), operand.render()),
        }
    }
}

impl fmt::Display for QueryClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A requested sort on one field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    pub fn is_descending(&self) -> bool {
        self.direction == SortDirection::Descending
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Ascending => "Asc",
            SortDirection::Descending => "Desc",
        };
        write!(f, "{} {}", self.field, direction)
    }
}

/// Value used for documents that lack the sort field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SortDefault {
    Numeric(f64),
    Text(String),
}

/// A sort as sent to the engine, with its missing-value default resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SortExpression {
    pub field: String,
    pub direction: SortDirection,
    pub default: SortDefault,
}

impl SortExpression {
    pub fn numeric(sort: &Sort) -> Self {
        Self {
            field: sort.field.clone(),
            direction: sort.direction,
            default: SortDefault::Numeric(0.0),
        }
    }

    pub fn text(sort: &Sort) -> Self {
        Self {
            field: sort.field.clone(),
            direction: sort.direction,
            default: SortDefault::Text(String::new()),
        }
    }
}

/// A query as submitted to a search backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DocumentQuery {
    /// Rendered fragments joined by spaces; empty matches everything.
    pub query: String,
    /// The clause tree the query string was rendered from.
    pub clauses: Vec<QueryClause>,
    pub sort: Vec<SortExpression>,
    /// Maximum number of documents to return. `None` leaves it to the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl DocumentQuery {
    pub fn new(clauses: Vec<QueryClause>) -> Self {
        let query = clauses
            .iter()
            .map(QueryClause::render)
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            query,
            clauses,
            sort: Vec::new(),
            limit: None,
        }
    }

    pub fn with_sort(mut self, sort: Vec<SortExpression>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

/// Request for a page of document ids, used to sweep an index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RangeRequest {
    pub limit: usize,
}

impl RangeRequest {
    pub fn ids(limit: usize) -> Self {
        Self { limit }
    }
}
