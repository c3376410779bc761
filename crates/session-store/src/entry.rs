use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored value together with the instant it stops being visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// The serialized value.
    pub value: Value,

    /// When the value expires.
    pub expires_at: DateTime<Utc>,
}

impl StoredEntry {
    /// Creates an entry that expires `ttl` after `now`.
    pub fn new(value: Value, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now + ttl,
        }
    }

    /// Returns true once `now` has reached the expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_expires_exactly_at_ttl() {
        let now = Utc::now();
        let entry = StoredEntry::new(Value::Bool(true), now, Duration::days(1));

        assert!(!entry.is_expired(now));
        assert!(!entry.is_expired(now + Duration::hours(23)));
        assert!(entry.is_expired(now + Duration::days(1)));
    }

    #[test]
    fn zero_ttl_is_immediately_expired() {
        let now = Utc::now();
        let entry = StoredEntry::new(Value::Null, now, Duration::zero());
        assert!(entry.is_expired(now));
    }
}
