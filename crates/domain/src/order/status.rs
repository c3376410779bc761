//! Order status flags and the lifecycle phases derived from them.

use serde::{Deserialize, Serialize};

/// Serving and payment flags of an order, as last reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    /// The kitchen has delivered the food.
    pub is_served: bool,

    /// The bill has been settled (terminal).
    pub is_paid: bool,
}

impl OrderStatus {
    /// Status of a freshly placed order: neither served nor paid.
    pub fn placed() -> Self {
        Self::default()
    }

    pub fn new(is_served: bool, is_paid: bool) -> Self {
        Self { is_served, is_paid }
    }

    /// Returns true while the order still awaits payment.
    pub fn is_open(&self) -> bool {
        !self.is_paid
    }

    /// Returns true when the order is served but not yet paid.
    pub fn awaiting_payment(&self) -> bool {
        self.is_served && !self.is_paid
    }

    /// Returns the lifecycle phase for this status.
    pub fn phase(&self) -> OrderPhase {
        OrderPhase::from_status(Some(*self))
    }
}

/// The phase of a session's order in its lifecycle.
///
/// State transitions:
/// ```text
/// NoOrder ──► Placed ──► Served ──► Paid ──► (collapses to NoOrder)
///               ▲          │
///               └──────────┘  items added to the open order
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderPhase {
    /// No order is open; the cart is being built.
    #[default]
    NoOrder,

    /// Order submitted and being prepared.
    Placed,

    /// Food delivered, awaiting payment.
    Served,

    /// Payment settled (terminal state).
    Paid,
}

impl OrderPhase {
    /// Derives the phase from an optional status.
    pub fn from_status(status: Option<OrderStatus>) -> Self {
        match status {
            None => OrderPhase::NoOrder,
            Some(s) if s.is_paid => OrderPhase::Paid,
            Some(s) if s.is_served => OrderPhase::Served,
            Some(_) => OrderPhase::Placed,
        }
    }

    /// Returns true if a new order can be placed in this phase.
    pub fn can_place(&self) -> bool {
        matches!(self, OrderPhase::NoOrder)
    }

    /// Returns true if items can be added to the open order in this phase.
    pub fn can_amend(&self) -> bool {
        matches!(self, OrderPhase::Placed | OrderPhase::Served)
    }

    /// Returns true if the order can be paid in this phase.
    pub fn can_pay(&self) -> bool {
        matches!(self, OrderPhase::Served)
    }

    /// Returns true if this is a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderPhase::Paid)
    }

    /// Returns the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPhase::NoOrder => "NoOrder",
            OrderPhase::Placed => "Placed",
            OrderPhase::Served => "Served",
            OrderPhase::Paid => "Paid",
        }
    }
}

impl std::fmt::Display for OrderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
