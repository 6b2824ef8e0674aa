//! Result types returned by search backends.

use serde::{Deserialize, Serialize};

use super::document::Document;

/// Documents returned for a [`DocumentQuery`](crate::DocumentQuery).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QueryResults {
    /// Total number of matching documents.
    /// May be greater than the number of returned documents due to the limit.
    pub total_matches: u64,

    /// The returned documents, in engine order.
    pub documents: Vec<Document>,

    /// Continuation cursor for fetching the next page, if the engine supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl QueryResults {
    pub fn new(total_matches: u64, documents: Vec<Document>) -> Self {
        Self {
            total_matches,
            documents,
            cursor: None,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// One page of document ids from an index sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RangePage {
    pub ids: Vec<String>,
}

impl RangePage {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_results_omits_missing_cursor() {
        let results = QueryResults::new(3, vec![Document::new("1")]);
        let json = serde_json::to_value(&results).unwrap();

        assert_eq!(json["total_matches"], 3);
        assert!(json.get("cursor").is_none());
        assert!(!results.is_empty());
    }

    #[test]
    fn test_range_page() {
        let page = RangePage {
            ids: vec!["1".into(), "2".into()],
        };
        assert_eq!(page.len(), 2);
        assert!(RangePage::default().is_empty());
    }
}
