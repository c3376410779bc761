//! Persisted session keys and their lifetimes.

use chrono::Duration;

/// A value the client keeps across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// The cart contents.
    Cart,

    /// Reference of the single open order.
    CurrentOrderId,

    /// Last known serving/payment status of the open order.
    OrderStatus,

    /// The logged-in customer record.
    Customer,
}

impl SessionKey {
    /// All keys, in the order they are cleared at logout.
    pub const ALL: [SessionKey; 4] = [
        SessionKey::Customer,
        SessionKey::CurrentOrderId,
        SessionKey::OrderStatus,
        SessionKey::Cart,
    ];

    /// Returns the storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::Cart => "cart",
            SessionKey::CurrentOrderId => "currentOrderId",
            SessionKey::OrderStatus => "orderStatus",
            SessionKey::Customer => "customer",
        }
    }

    /// Returns how long a saved value stays visible.
    pub fn ttl(&self) -> Duration {
        match self {
            SessionKey::Cart | SessionKey::Customer => Duration::days(7),
            SessionKey::CurrentOrderId | SessionKey::OrderStatus => Duration::days(1),
        }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
