//! Configuration types for the SearchIndexService.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Largest number of documents the engine accepts in one delete.
pub const MAX_DELETE_PAGE_SIZE: usize = 200;

/// Largest result window the engine serves for one query.
pub const DEFAULT_MAX_QUERY_LIMIT: usize = 1000;

/// Configuration for the SearchIndexService.
///
/// Controls index naming and the engine limits the service works around.
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchIndexServiceConfig {
    /// Prepended to every index name, e.g. `"staging-"`.
    pub index_prefix: String,

    /// Effective query limits above this value are logged as a warning.
    /// Defaults to 1000.
    pub max_query_limit: usize,

    /// Page size used when sweeping an index in `remove_all`.
    /// Defaults to 200 and is never larger.
    pub delete_page_size: usize,
}

impl Default for SearchIndexServiceConfig {
    fn default() -> Self {
        Self {
            index_prefix: String::new(),
            max_query_limit: DEFAULT_MAX_QUERY_LIMIT,
            delete_page_size: MAX_DELETE_PAGE_SIZE,
        }
    }
}

impl SearchIndexServiceConfig {
    /// Load the config from environment variables.
    ///
    /// Reads `SEARCH_INDEX_PREFIX`, `SEARCH_MAX_QUERY_LIMIT` and
    /// `SEARCH_DELETE_PAGE_SIZE`. Unset or unparsable values fall back to the
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            index_prefix: env::var("SEARCH_INDEX_PREFIX").unwrap_or(defaults.index_prefix),
            max_query_limit: env_or("SEARCH_MAX_QUERY_LIMIT", defaults.max_query_limit),
            delete_page_size: env_or("SEARCH_DELETE_PAGE_SIZE", defaults.delete_page_size),
        };
        let page_size = config.delete_page_size;
        config.with_delete_page_size(page_size)
    }

    /// Set the index name prefix.
    pub fn with_index_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.index_prefix = prefix.into();
        self
    }

    /// Set the query limit above which a warning is logged.
    pub fn with_max_query_limit(mut self, max_query_limit: usize) -> Self {
        self.max_query_limit = max_query_limit;
        self
    }

    /// Set the sweep page size, clamped to `1..=200`.
    pub fn with_delete_page_size(mut self, delete_page_size: usize) -> Self {
        let clamped = delete_page_size.clamp(1, MAX_DELETE_PAGE_SIZE);
        if clamped != delete_page_size {
            warn!(
                requested = delete_page_size,
                used = clamped,
                "Delete page size out of range"
            );
        }
        self.delete_page_size = clamped;
        self
    }

    /// Name of the index holding documents of the given entity kind.
    ///
    /// The prefix and kind are lower-cased, with `::` and `.` replaced by `-`,
    /// so Rust type paths make valid index names.
    pub fn index_name(&self, kind: &str) -> String {
        format!("{}{}", self.index_prefix, kind)
            .replace("::", "-")
            .replace('.', "-")
            .to_lowercase()
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key = %key, value = %raw, "Ignoring unparsable config value");
                default
            }
        },
        Err(_) => default,
    }
}
