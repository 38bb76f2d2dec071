use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

/// Storage key for the certificate lookup history.
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

/// How many lookups the history keeps.
pub const RECENT_SEARCHES_LIMIT: usize = 5;

/// KeyValueStore
///
/// Client-side string storage handed to views explicitly. Views never reach for
/// ambient global storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
    fn clear(&self);
}

/// MemoryStore
///
/// In-process implementation. Lives as long as the shell that owns it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// RecentSearches
///
/// Most-recent-first, de-duplicated history of certificate lookups, stored as a
/// JSON array under [`RECENT_SEARCHES_KEY`].
pub struct RecentSearches<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> RecentSearches<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// The stored history. A missing or corrupt value reads as empty.
    pub fn list(&self) -> Vec<String> {
        self.store
            .get(RECENT_SEARCHES_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Moves `term` to the front, dropping older duplicates and anything past the limit.
    pub fn record(&self, term: &str) -> Vec<String> {
        let term = term.trim();
        if term.is_empty() {
            return self.list();
        }

        let mut searches = self.list();
        searches.retain(|existing| existing != term);
        searches.insert(0, term.to_string());
        searches.truncate(RECENT_SEARCHES_LIMIT);

        match serde_json::to_string(&searches) {
            Ok(encoded) => self.store.set(RECENT_SEARCHES_KEY, encoded),
            Err(e) => tracing::warn!(error = %e, "could not encode recent searches"),
        }
        searches
    }

    pub fn clear(&self) {
        self.store.remove(RECENT_SEARCHES_KEY);
    }
}
