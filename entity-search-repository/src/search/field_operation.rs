use std::fmt;

use chrono::NaiveDate;
use entity_search_shared::{Entity, Number, Operand, Operator, QueryClause, SearchValue};

use super::SearchRequest;

/// Filters on one field of a [`SearchRequest`].
///
/// Every method appends one clause (or none, for an empty `in` list) and
/// returns the request.
///
/// Text passed to [`is`](Self::is) is searched as unquoted tokens. Text passed
/// to any other operator is matched as a quoted phrase.
#[must_use = "a filter is only added by calling one of the operators"]
pub struct FieldOperation<E> {
    request: SearchRequest<E>,
    field: String,
}

impl<E: Entity> FieldOperation<E> {
    pub(crate) fn new(request: SearchRequest<E>, field: String) -> Self {
        Self { request, field }
    }

    /// The field name as it will appear in the query.
    pub fn field_name(&self) -> &str {
        &self.field
    }

    /// Token match: `field:(tokens)` for text, `field:value` otherwise.
    pub fn is(self, value: impl Into<SearchValue>) -> SearchRequest<E> {
        let operand = match value.into() {
            SearchValue::Text(tokens) => Operand::Tokens(tokens),
            other => Operand::Value(other),
        };
        self.append(Operator::Is, operand)
    }

    /// Exact match: `field="phrase"`.
    pub fn eq(self, value: impl Into<SearchValue>) -> SearchRequest<E> {
        self.append(Operator::Equals, Operand::Value(value.into()))
    }

    pub fn less_than(self, value: impl Into<SearchValue>) -> SearchRequest<E> {
        self.append(Operator::LessThan, Operand::Value(value.into()))
    }

    pub fn less_than_equals(self, value: impl Into<SearchValue>) -> SearchRequest<E> {
        self.append(Operator::LessThanEquals, Operand::Value(value.into()))
    }

    pub fn greater_than(self, value: impl Into<SearchValue>) -> SearchRequest<E> {
        self.append(Operator::GreaterThan, Operand::Value(value.into()))
    }

    pub fn greater_than_equals(self, value: impl Into<SearchValue>) -> SearchRequest<E> {
        self.append(Operator::GreaterThanEquals, Operand::Value(value.into()))
    }

    /// Matches any of the values: `field:("a" OR "b")`.
    ///
    /// `None` entries are skipped. If nothing remains the request is returned
    /// unchanged.
    pub fn is_in<I, V>(self, values: I) -> SearchRequest<E>
    where
        I: IntoIterator<Item = Option<V>>,
        V: Into<SearchValue>,
    {
        let values: Vec<SearchValue> = values.into_iter().flatten().map(Into::into).collect();
        self.append_any_of(values)
    }

    /// Matches any of the numbers: `field:(1 OR 2.5)`.
    pub fn in_numbers<I, N>(self, values: I) -> SearchRequest<E>
    where
        I: IntoIterator<Item = Option<N>>,
        N: Into<Number>,
    {
        let values: Vec<SearchValue> = values
            .into_iter()
            .flatten()
            .map(|n| SearchValue::Number(n.into()))
            .collect();
        self.append_any_of(values)
    }

    /// Matches any of the dates: `field:(2013-01-01 OR 2013-02-12)`.
    pub fn in_dates<I>(self, values: I) -> SearchRequest<E>
    where
        I: IntoIterator<Item = Option<NaiveDate>>,
    {
        let values: Vec<SearchValue> = values
            .into_iter()
            .flatten()
            .map(SearchValue::Date)
            .collect();
        self.append_any_of(values)
    }

    fn append_any_of(self, values: Vec<SearchValue>) -> SearchRequest<E> {
        if values.is_empty() {
            return self.request;
        }
        self.append(Operator::Is, Operand::AnyOf(values))
    }

    fn append(self, operator: Operator, operand: Operand) -> SearchRequest<E> {
        self.request
            .push_clause(QueryClause::field(self.field, operator, operand))
    }
}

impl<E: Entity> fmt::Debug for FieldOperation<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOperation")
            .field("request", &self.request.to_string())
            .field("field", &self.field)
            .finish()
    }
}
