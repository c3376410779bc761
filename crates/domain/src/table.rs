//! Tables and their customer/order association.

use common::{CustomerId, OrderRef, TableNo};
use serde::{Deserialize, Serialize};

/// A physical table as recorded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub table_no: TableNo,

    /// The customer currently seated, if any.
    pub customer_id: Option<CustomerId>,

    /// The order currently associated with the table, if any.
    pub order_id: Option<OrderRef>,
}

impl Table {
    /// Returns true if no customer is seated at the table.
    pub fn is_available(&self) -> bool {
        self.customer_id.as_ref().is_none_or(CustomerId::is_blank)
    }
}

/// Change to a table's association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAssignment {
    /// Seat a customer at the table.
    Assign(CustomerId),

    /// Clear both the customer and the order from the table.
    Release,
}
