//! OpenSearch index settings and mappings.
//!
//! Entity indices are created with dynamic templates rather than a fixed
//! schema, since each entity kind chooses its own searchable fields.

use serde_json::{json, Value};

/// Keyword sub-field added to every text field, used for sorting.
pub const KEYWORD_SUFFIX: &str = "raw";

/// Get the index settings and mappings for an entity index.
///
/// The configuration includes:
/// - **Text fields**: analysed `text` with a `raw` keyword sub-field for sorting
/// - **Numbers**: always mapped as `double`, matching the f64 field values
/// - **Dates**: detected from `yyyy-MM-dd` strings
///
/// Geo points cannot be detected dynamically; the provider maps them
/// explicitly on first write.
///
/// # Sharding Configuration
///
/// - 1 primary shard
/// - 1 replica for redundancy
pub fn get_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "date_detection": true,
            "dynamic_date_formats": ["yyyy-MM-dd"],
            "dynamic_templates": [
                {
                    "strings": {
                        "match_mapping_type": "string",
                        "mapping": {
                            "type": "text",
                            "fields": {
                                KEYWORD_SUFFIX: {
                                    "type": "keyword",
                                    "ignore_above": 256
                                }
                            }
                        }
                    }
                },
                {
                    "integers": {
                        "match_mapping_type": "long",
                        "mapping": { "type": "double" }
                    }
                },
                {
                    "floats": {
                        "match_mapping_type": "double",
                        "mapping": { "type": "double" }
                    }
                }
            ]
        }
    })
}

/// Mapping update declaring a geo point field.
pub fn geo_point_mapping(field: &str) -> Value {
    json!({
        "properties": {
            field: { "type": "geo_point" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_structure() {
        let settings = get_index_settings();

        assert!(settings["settings"]["number_of_shards"].is_number());
        assert!(settings["settings"]["number_of_replicas"].is_number());

        let templates = settings["mappings"]["dynamic_templates"].as_array().unwrap();
        assert_eq!(templates.len(), 3);
        assert_eq!(
            templates[0]["strings"]["mapping"]["fields"]["raw"]["type"],
            "keyword"
        );
        assert_eq!(settings["mappings"]["dynamic_date_formats"][0], "yyyy-MM-dd");
    }

    #[test]
    fn test_geo_point_mapping() {
        let mapping = geo_point_mapping("location");
        assert_eq!(mapping["properties"]["location"]["type"], "geo_point");
    }
}
