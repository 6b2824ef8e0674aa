use std::fmt;
use std::marker::PhantomData;

use entity_search_shared::{encode_field_name, Entity, QueryClause, Sort};

use super::{FieldOperation, SearchResult, SortOperation};
use crate::service::SearchIndexService;

/// A search over the index of one entity kind.
///
/// Built fluently and executed with [`search`](Self::search). The request is
/// not consumed by `search`, and each call runs the query again.
///
/// # Example
///
/// ```ignore
/// let mut result = service
///     .search::<Product>()
///     .field("price").greater_than_equals(15.5)
///     .field("name").is("lamp")
///     .order("price").descending()
///     .limit(20)
///     .search();
///
/// let ids = result.search_result_ids().await?;
/// ```
pub struct SearchRequest<E> {
    service: SearchIndexService,
    clauses: Vec<QueryClause>,
    sorts: Vec<Sort>,
    limit: Option<usize>,
    offset: Option<usize>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SearchRequest<E> {
    pub(crate) fn new(service: SearchIndexService) -> Self {
        Self {
            service,
            clauses: Vec::new(),
            sorts: Vec::new(),
            limit: None,
            offset: None,
            _entity: PhantomData,
        }
    }

    /// Adds free text, passed to the engine as-is.
    pub fn query(self, text: impl Into<String>) -> Self {
        self.push_clause(QueryClause::Raw(text.into()))
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `offset` results. Combined with a limit, the engine is
    /// asked for `limit + offset` documents and the skipped ones are dropped
    /// locally.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Starts a filter on a field. Dotted paths are accepted.
    pub fn field(self, name: &str) -> FieldOperation<E> {
        FieldOperation::new(self, encode_field_name(name))
    }

    /// Starts a sort on a field. Sorts apply in the order they are added.
    pub fn order(self, name: &str) -> SortOperation<E> {
        SortOperation::new(self, encode_field_name(name))
    }

    /// Submits the query. The result is awaited lazily by its accessors.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the query is spawned.
    pub fn search(&self) -> SearchResult<E> {
        self.service.create_search_result(self)
    }

    pub(crate) fn push_clause(mut self, clause: QueryClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub(crate) fn push_sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn clauses(&self) -> &[QueryClause] {
        &self.clauses
    }

    /// The rendered query fragments, in the order they were added.
    pub fn fragments(&self) -> Vec<String> {
        self.clauses.iter().map(QueryClause::render).collect()
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn requested_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn requested_offset(&self) -> Option<usize> {
        self.offset
    }
}

impl<E> Clone for SearchRequest<E> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            clauses: self.clauses.clone(),
            sorts: self.sorts.clone(),
            limit: self.limit,
            offset: self.offset,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Display for SearchRequest<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fragments = self.fragments();
        let query = if fragments.is_empty() {
            "*".to_string()
        } else {
            fragments.join(" ")
        };
        write!(f, "{} where {}", E::kind(), query)?;
        if !self.sorts.is_empty() {
            let sorts: Vec<String> = self.sorts.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", sorts.join(", "))?;
        }
        Ok(())
    }
}

impl<E: Entity> fmt::Debug for SearchRequest<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchRequest")
            .field("kind", &E::kind())
            .field("clauses", &self.clauses)
            .field("sorts", &self.sorts)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use crate::memory::MemorySearchProvider;
    use crate::service::SearchIndexService;
    use crate::test_support::Product;

    fn service() -> SearchIndexService {
        SearchIndexService::new(Arc::new(MemorySearchProvider::new()))
    }

    #[test]
    fn test_numeric_operands() {
        let request = service()
            .search::<Product>()
            .field("price")
            .greater_than_equals(15.50)
            .field("price")
            .less_than_equals(11.0)
            .field("quantity")
            .greater_than(3)
            .field("quantity")
            .less_than(10i64);

        assert_eq!(
            request.fragments(),
            vec!["price>=15.5", "price<=11", "quantity>3", "quantity<10"]
        );
    }

    #[test]
    fn test_string_operands() {
        let request = service()
            .search::<Product>()
            .field("name")
            .eq("name")
            .field("name")
            .is("blue lamp")
            .field("name")
            .eq("\"Oh no\" says O'Neil");

        assert_eq!(
            request.fragments(),
            vec![
                r#"name="name""#,
                "name:(blue lamp)",
                r#"name="\"Oh no\" says O'Neil""#,
            ]
        );
    }

    #[test]
    fn test_in_variants() {
        let jan = NaiveDate::from_ymd_opt(2013, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2013, 2, 12).unwrap();
        let request = service()
            .search::<Product>()
            .field("name")
            .is_in([Some("a"), Some("b"), None])
            .field("price")
            .in_numbers([Some(1.5), None, Some(2.0)])
            .field("released")
            .in_dates([Some(jan), Some(feb)]);

        assert_eq!(
            request.fragments(),
            vec![
                r#"name:("a" OR "b")"#,
                "price:(1.5 OR 2)",
                "released:(2013-01-01 OR 2013-02-12)",
            ]
        );
    }

    #[test]
    fn test_empty_in_adds_nothing() {
        let request = service()
            .search::<Product>()
            .field("name")
            .is_in(Vec::<Option<&str>>::new())
            .field("name")
            .is_in([None::<&str>, None]);

        assert!(request.clauses().is_empty());
    }

    #[test]
    fn test_date_operand() {
        let date = NaiveDate::from_ymd_opt(2013, 3, 4).unwrap();
        let request = service()
            .search::<Product>()
            .field("released")
            .greater_than(date);

        assert_eq!(request.fragments(), vec!["released>2013-03-04"]);
    }

    #[test]
    fn test_dotted_field_names_are_encoded() {
        let request = service()
            .search::<Product>()
            .field("dimensions.weight")
            .greater_than(5)
            .order("dimensions.weight")
            .ascending();

        assert_eq!(request.fragments(), vec!["dimensions_weight>5"]);
        assert_eq!(request.sorts()[0].field, "dimensions_weight");
    }

    #[test]
    fn test_display() {
        let request = service().search::<Product>();
        assert_eq!(request.to_string(), "Product where *");

        let request = request
            .query("lamp")
            .field("price")
            .less_than(20)
            .order("name")
            .ascending()
            .order("price")
            .descending();
        assert_eq!(
            request.to_string(),
            "Product where lamp price<20 [name Asc, price Desc]"
        );
    }

    #[test]
    fn test_limit_and_offset() {
        let request = service().search::<Product>();
        assert_eq!(request.requested_limit(), None);
        assert_eq!(request.requested_offset(), None);

        let request = request.limit(10).offset(5);
        assert_eq!(request.requested_limit(), Some(10));
        assert_eq!(request.requested_offset(), Some(5));
    }
}
