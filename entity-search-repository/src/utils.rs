//! Utility functions for the entity search repository.

use tracing::warn;

/// Document id for an entity id.
pub fn id_to_string(id: i64) -> String {
    id.to_string()
}

/// Parse a document id back into an entity id.
///
/// Malformed ids are logged and yield `None`.
pub fn parse_entity_id(document_id: &str) -> Option<i64> {
    match document_id.parse::<i64>() {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(
                document_id = %document_id,
                error = %e,
                "Dropping search result with a non-numeric id"
            );
            None
        }
    }
}

/// Parse document ids into entity ids, dropping malformed ones.
///
/// # Example
///
/// ```
/// use entity_search_repository::parse_entity_ids;
///
/// let ids = parse_entity_ids(&["1".to_string(), "x".to_string(), "3".to_string()]);
/// assert_eq!(ids, vec![1, 3]);
/// ```
pub fn parse_entity_ids(document_ids: &[String]) -> Vec<i64> {
    document_ids
        .iter()
        .filter_map(|id| parse_entity_id(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        assert_eq!(parse_entity_id(&id_to_string(-42)), Some(-42));
    }

    #[test]
    fn test_parse_entity_id_invalid() {
        assert_eq!(parse_entity_id("abc"), None);
        assert_eq!(parse_entity_id(""), None);
        assert_eq!(parse_entity_id("1.5"), None);
    }

    #[test]
    fn test_parse_entity_ids_keeps_order() {
        let ids = vec!["3".to_string(), "bad".to_string(), "1".to_string()];
        assert_eq!(parse_entity_ids(&ids), vec![3, 1]);
    }
}
