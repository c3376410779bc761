//! Canonical order records returned by the backend.

use chrono::{NaiveDate, NaiveTime};
use common::{CustomerId, DishId, OrderRef, TableNo};
use serde::{Deserialize, Serialize};

use crate::{CartItem, Money};

use super::{OrderPhase, OrderStatus};

/// One dish line on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The dish identifier.
    pub dish_id: DishId,

    /// Dish name at the time of ordering.
    pub name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Unit price at the time of ordering.
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(
        dish_id: impl Into<DishId>,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            dish_id: dish_id.into(),
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line (quantity * unit_price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

impl From<&CartItem> for LineItem {
    fn from(item: &CartItem) -> Self {
        Self {
            dish_id: item.dish.id.clone(),
            name: item.dish.name.clone(),
            quantity: item.quantity,
            unit_price: item.dish.price,
        }
    }
}

/// An order as recorded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderRef,
    pub customer_id: CustomerId,
    pub table_no: TableNo,

    /// Amount as computed when the order was placed (and amended).
    pub amount: Money,

    /// Local date the order was placed, if the backend reported one.
    pub date: Option<NaiveDate>,

    /// Local time (minute precision) the order was placed.
    pub time: Option<NaiveTime>,

    pub dishes: Vec<LineItem>,
    pub status: OrderStatus,
}

impl Order {
    /// Returns the lifecycle phase of this order.
    pub fn phase(&self) -> OrderPhase {
        self.status.phase()
    }

    /// Returns true while the order awaits payment.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Sort key placing later orders after earlier ones; undated orders sort first.
    pub fn placed_key(&self) -> (Option<NaiveDate>, Option<NaiveTime>) {
        (self.date, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dish;

    #[test]
    fn test_line_item_from_cart_item() {
        let item = CartItem::new(Dish::new("D1", "Dal", Money::from_major(120)), 3);
        let line = LineItem::from(&item);

        assert_eq!(line.dish_id.as_str(), "D1");
        assert_eq!(line.total_price(), Money::from_major(360));
    }

    #[test]
    fn test_placed_key_orders_by_date_then_time() {
        let mk = |date: &str, time: &str| Order {
            id: OrderRef::new("O"),
            customer_id: CustomerId::new("C1"),
            table_no: TableNo::new("5"),
            amount: Money::zero(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            time: NaiveTime::parse_from_str(time, "%H:%M").ok(),
            dishes: vec![],
            status: OrderStatus::placed(),
        };

        let early = mk("2025-03-01", "21:00");
        let later_same_day = mk("2025-03-01", "21:30");
        let next_day = mk("2025-03-02", "09:00");

        assert!(early.placed_key() < later_same_day.placed_key());
        assert!(later_same_day.placed_key() < next_day.placed_key());
    }
}
