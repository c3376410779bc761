use std::sync::Arc;

use chrono::Duration;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Core trait for session store implementations.
///
/// A session store keeps JSON values under string keys, each with its own
/// time-to-live. Implementations must never surface errors to callers: a
/// value that cannot be read is reported as absent, and a write that cannot
/// be completed is logged and dropped.
pub trait SessionStore: Send + Sync {
    /// Returns the value stored under `key`, or None if it is missing or expired.
    fn load(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`, replacing any prior value, visible for `ttl`.
    fn save(&self, key: &str, value: Value, ttl: Duration);

    /// Removes the value stored under `key`. Removing a missing key is a no-op.
    fn clear(&self, key: &str);
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn load(&self, key: &str) -> Option<Value> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: Value, ttl: Duration) {
        (**self).save(key, value, ttl)
    }

    fn clear(&self, key: &str) {
        (**self).clear(key)
    }
}

/// Extension trait providing typed access on top of any [`SessionStore`].
pub trait SessionStoreExt: SessionStore {
    /// Loads and decodes the value under `key`.
    ///
    /// A value that does not decode as `T` is treated as absent.
    fn load_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.load(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable session value");
                None
            }
        }
    }

    /// Encodes `value` and stores it under `key` for `ttl`.
    fn save_as<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(encoded) => self.save(key, encoded, ttl),
            Err(e) => tracing::warn!(key, error = %e, "failed to encode session value"),
        }
    }
}

// Blanket implementation for all SessionStore implementations
impl<T: SessionStore + ?Sized> SessionStoreExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemorySessionStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Flags {
        served: bool,
        paid: bool,
    }

    #[test]
    fn typed_roundtrip() {
        let store = InMemorySessionStore::new();
        let flags = Flags {
            served: true,
            paid: false,
        };

        store.save_as("status", &flags, Duration::days(1));

        assert_eq!(store.load_as::<Flags>("status"), Some(flags));
    }

    #[test]
    fn undecodable_value_is_absent() {
        let store = InMemorySessionStore::new();
        store.save("status", Value::String("not flags".into()), Duration::days(1));

        assert_eq!(store.load_as::<Flags>("status"), None);
        // The raw value is still there; only the typed view rejects it.
        assert!(store.load("status").is_some());
    }

    #[test]
    fn works_through_arc() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        store.save_as("count", &3u32, Duration::days(1));
        assert_eq!(store.load_as::<u32>("count"), Some(3));
    }
}
