//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashSet;
use entity_search_shared::{
    format_date, Document, DocumentQuery, FieldValue, GeoPoint, QueryResults, RangePage,
    RangeRequest,
};
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesPutMappingParts},
    params::Refresh,
    BulkParts, OpenSearch, SearchParts,
};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::{geo_point_mapping, get_index_settings};
use crate::opensearch::query_translator::{range_body, search_body};

/// OpenSearch provider implementation.
///
/// Documents are written with the bulk API and searched with `query_string`
/// queries translated from the clause tree.
///
/// # Example
///
/// ```ignore
/// let provider = OpenSearchProvider::new("http://localhost:9200").await?;
/// provider.ensure_index_exists("product").await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    geo_fields: DashSet<(String, String)>,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch provider");

        Ok(Self {
            client,
            geo_fields: DashSet::new(),
        })
    }

    /// Check that the cluster answers.
    pub async fn ping(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchIndexError::connection(format!(
                "Ping failed with status {}",
                status
            )));
        }
        Ok(())
    }

    /// Geo point fields are declared before their first write. Dynamic
    /// mapping would store them as plain objects.
    async fn ensure_geo_mappings(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<(), SearchIndexError> {
        let mut unmapped: Vec<String> = Vec::new();
        for document in documents {
            for field in &document.fields {
                if matches!(field.value, FieldValue::GeoPoint(_))
                    && !unmapped.contains(&field.name)
                    && !self
                        .geo_fields
                        .contains(&(index.to_string(), field.name.clone()))
                {
                    unmapped.push(field.name.clone());
                }
            }
        }
        if unmapped.is_empty() {
            return Ok(());
        }

        self.ensure_index_exists(index).await?;
        for field in unmapped {
            let response = self
                .client
                .indices()
                .put_mapping(IndicesPutMappingParts::Index(&[index]))
                .body(geo_point_mapping(&field))
                .send()
                .await
                .map_err(|e| SearchIndexError::index(e.to_string()))?;

            let status = response.status_code();
            if !status.is_success() {
                let error_body = response.text().await.unwrap_or_default();
                error!(status = %status, body = %error_body, field = %field, "Geo mapping request failed");
                return Err(SearchIndexError::index(format!(
                    "Geo mapping for '{}' failed with status {}: {}",
                    field, status, error_body
                )));
            }
            debug!(index = %index, field = %field, "Mapped geo point field");
            self.geo_fields.insert((index.to_string(), field));
        }
        Ok(())
    }

    async fn send_bulk(
        &self,
        index: &str,
        action: BulkAction,
        body: Vec<JsonBody<Value>>,
    ) -> Result<(), SearchIndexError> {
        let operations = body.len();
        let on_error = |reason: String| action.error(reason);
        let mut request = self.client.bulk(BulkParts::Index(index)).body(body);
        if let Some(refresh) = action.refresh() {
            request = request.refresh(refresh);
        }
        let response = request
            .send()
            .await
            .map_err(|e| on_error(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(on_error(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        let failures = bulk_failures(&result);
        if !failures.is_empty() {
            error!(index = %index, failed = failures.len(), "Bulk request had failures");
            return Err(on_error(format!(
                "{} bulk operations failed: {}",
                failures.len(),
                failures.join("; ")
            )));
        }

        debug!(index = %index, operations, "Bulk request completed");
        Ok(())
    }

    async fn search(&self, index: &str, body: Value) -> Result<Option<Value>, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::query(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            debug!(index = %index, "Search against missing index");
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(SearchIndexError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let result = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        Ok(Some(result))
    }
}

/// The kind of operation in a bulk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulkAction {
    Index,
    Delete,
}

impl BulkAction {
    /// Deletes wait for the next refresh, so a following range search no
    /// longer returns the removed ids.
    fn refresh(self) -> Option<Refresh> {
        match self {
            Self::Index => None,
            Self::Delete => Some(Refresh::WaitFor),
        }
    }

    fn error(self, reason: String) -> SearchIndexError {
        match self {
            Self::Index => SearchIndexError::IndexError(reason),
            Self::Delete => SearchIndexError::DeleteError(reason),
        }
    }
}

/// `_source` body for a document.
fn document_source(document: &Document) -> Value {
    let mut source = Map::new();
    for field in &document.fields {
        let value = match &field.value {
            FieldValue::Text(text) => json!(text),
            FieldValue::Number(number) => json!(number),
            FieldValue::Date(date) => json!(format_date(date)),
            FieldValue::GeoPoint(point) => json!({ "lat": point.latitude, "lon": point.longitude }),
        };
        source.insert(field.name.clone(), value);
    }
    Value::Object(source)
}

fn field_from_source(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::String(s) => Some(match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => FieldValue::Date(date),
            Err(_) => FieldValue::Text(s.clone()),
        }),
        Value::Object(point) => {
            let latitude = point.get("lat")?.as_f64()?;
            let longitude = point.get("lon")?.as_f64()?;
            Some(FieldValue::GeoPoint(GeoPoint::new(latitude, longitude)))
        }
        _ => None,
    }
}

fn document_from_hit(hit: &Value) -> Option<Document> {
    let mut document = Document::new(hit.get("_id")?.as_str()?);
    if let Some(source) = hit.get("_source").and_then(Value::as_object) {
        for (name, value) in source {
            if let Some(field) = field_from_source(value) {
                document.push(name.clone(), field);
            }
        }
    }
    Some(document)
}

fn parse_search_response(result: &Value) -> Result<QueryResults, SearchIndexError> {
    let hits = result
        .get("hits")
        .ok_or_else(|| SearchIndexError::parse("search response has no hits"))?;
    let total_matches = hits["total"]["value"]
        .as_u64()
        .or_else(|| hits["total"].as_u64())
        .unwrap_or(0);
    let raw_hits = hits["hits"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    let documents = raw_hits.iter().filter_map(document_from_hit).collect();
    let cursor = raw_hits
        .last()
        .and_then(|hit| hit.get("sort"))
        .map(Value::to_string);

    Ok(QueryResults::new(total_matches, documents).with_cursor(cursor))
}

/// Reasons for failed items in a bulk response.
fn bulk_failures(result: &Value) -> Vec<String> {
    if !result["errors"].as_bool().unwrap_or(false) {
        return Vec::new();
    }
    result["items"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
        .filter_map(|item| item.as_object()?.values().next())
        .filter_map(|outcome| {
            let error = outcome.get("error")?;
            let id = outcome.get("_id").and_then(Value::as_str).unwrap_or("?");
            let reason = error
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            Some(format!("{id}: {reason}"))
        })
        .collect()
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    /// Create the index with entity settings if it does not exist yet.
    async fn ensure_index_exists(&self, index: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if response.status_code().is_success() {
            debug!(index = %index, "Index already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(get_index_settings())
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            // Another writer may have created it since the existence check.
            if error_body.contains("resource_already_exists_exception") {
                return Ok(());
            }
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::index_creation(format!(
                "Creating index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Created search index");
        Ok(())
    }

    async fn put_documents(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<(), SearchIndexError> {
        if documents.is_empty() {
            return Ok(());
        }
        self.ensure_geo_mappings(index, documents).await?;

        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for document in documents {
            body.push(json!({ "index": { "_id": document.id } }).into());
            body.push(document_source(document).into());
        }
        self.send_bulk(index, BulkAction::Index, body).await
    }

    /// Missing documents are not an error. Returns once the deletes are
    /// visible to searches.
    async fn delete_documents(&self, index: &str, ids: &[String]) -> Result<(), SearchIndexError> {
        if ids.is_empty() {
            return Ok(());
        }
        let body: Vec<JsonBody<Value>> = ids
            .iter()
            .map(|id| json!({ "delete": { "_id": id } }).into())
            .collect();
        self.send_bulk(index, BulkAction::Delete, body).await
    }

    async fn query(
        &self,
        index: &str,
        query: &DocumentQuery,
    ) -> Result<QueryResults, SearchIndexError> {
        match self.search(index, search_body(query)).await? {
            Some(result) => parse_search_response(&result),
            None => Ok(QueryResults::default()),
        }
    }

    async fn get_range(
        &self,
        index: &str,
        request: &RangeRequest,
    ) -> Result<RangePage, SearchIndexError> {
        let ids = match self.search(index, range_body(request.limit)).await? {
            Some(result) => parse_search_response(&result)?
                .documents
                .into_iter()
                .map(|document| document.id)
                .collect(),
            None => Vec::new(),
        };
        Ok(RangePage { ids })
    }
}
