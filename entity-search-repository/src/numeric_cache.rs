//! Cache of which (entity kind, field) pairs sort numerically.

use dashmap::DashMap;
use tracing::debug;

/// Remembers whether a field of an entity kind is numeric.
///
/// Lookups are resolved at most once per (kind, field) until the kind is
/// invalidated. Concurrent misses may resolve twice; both store the same
/// answer.
#[derive(Debug, Default)]
pub struct NumericFieldCache {
    entries: DashMap<(String, String), bool>,
}

impl NumericFieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached answer, or runs `resolve` and caches its result.
    pub fn is_numeric<F>(&self, kind: &str, field: &str, resolve: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        let key = (kind.to_string(), field.to_string());
        if let Some(cached) = self.entries.get(&key) {
            return *cached;
        }
        let numeric = resolve();
        self.entries.insert(key, numeric);
        numeric
    }

    /// Drops every cached answer for the kind.
    pub fn invalidate_kind(&self, kind: &str) {
        let before = self.entries.len();
        self.entries.retain(|(cached_kind, _), _| cached_kind != kind);
        debug!(
            kind = %kind,
            dropped = before.saturating_sub(self.entries.len()),
            "Invalidated numeric field cache"
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
