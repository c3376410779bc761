use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Duration;
use serde_json::Value;

use crate::{Clock, StoredEntry, SystemClock, store::SessionStore};

/// In-memory session store.
///
/// Values live as long as the process; expiry is evaluated lazily on load
/// against the configured [`Clock`].
#[derive(Clone)]
pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<String, StoredEntry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    /// Creates a new empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates a new empty store using the given clock.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock: Arc::new(clock),
        }
    }

    /// Returns the number of unexpired entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    /// Returns true if no unexpired entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionStore")
            .field("len", &self.len())
            .finish()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    fn save(&self, key: &str, value: Value, ttl: Duration) {
        let entry = StoredEntry::new(value, self.clock.now(), ttl);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), entry);
    }

    fn clear(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;
    use serde_json::json;

    #[test]
    fn save_then_load() {
        let store = InMemorySessionStore::new();
        store.save("cart", json!([1, 2]), Duration::days(7));
        assert_eq!(store.load("cart"), Some(json!([1, 2])));
    }

    #[test]
    fn save_overwrites() {
        let store = InMemorySessionStore::new();
        store.save("cart", json!(1), Duration::days(7));
        store.save("cart", json!(2), Duration::days(7));
        assert_eq!(store.load("cart"), Some(json!(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_key_is_absent() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.load("nope"), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let store = InMemorySessionStore::new();
        store.save("cart", json!(1), Duration::days(7));

        store.clear("cart");
        store.clear("cart");

        assert_eq!(store.load("cart"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn keys_expire_independently() {
        let clock = ManualClock::default();
        let store = InMemorySessionStore::with_clock(clock.clone());

        store.save("cart", json!("c"), Duration::days(7));
        store.save("currentOrderId", json!("o"), Duration::days(1));

        clock.advance(Duration::days(2));

        assert_eq!(store.load("currentOrderId"), None);
        assert_eq!(store.load("cart"), Some(json!("c")));

        clock.advance(Duration::days(5));
        assert_eq!(store.load("cart"), None);
    }

    #[test]
    fn clones_share_state() {
        let store = InMemorySessionStore::new();
        let other = store.clone();
        store.save("k", json!(true), Duration::days(1));
        assert_eq!(other.load("k"), Some(json!(true)));
    }
}
