//! Order commands and the requests they turn into.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use common::{CustomerId, TableNo};

use crate::error::ValidationError;
use crate::{Cart, LineItem, Money};

use super::OrderStatus;

/// Command to place a new dine-in order from the session cart.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    /// The table the order is served to.
    pub table_no: TableNo,

    /// The customer placing the order, if one is logged in.
    pub customer_id: Option<CustomerId>,
}

impl PlaceOrder {
    /// Creates a new PlaceOrder command.
    pub fn new(table_no: impl Into<TableNo>, customer_id: Option<CustomerId>) -> Self {
        Self {
            table_no: table_no.into(),
            customer_id,
        }
    }

    /// Checks the command against `cart` without touching anything.
    ///
    /// Checks run in a fixed order: cart, table, customer.
    pub fn validate(&self, cart: &Cart) -> Result<(), ValidationError> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        if self.table_no.is_blank() {
            return Err(ValidationError::MissingTableNumber);
        }
        match &self.customer_id {
            Some(id) if !id.is_blank() => Ok(()),
            _ => Err(ValidationError::MissingCustomer),
        }
    }

    /// Builds the order request for `cart`, stamped with `placed_at`.
    pub fn into_new_order(
        self,
        cart: &Cart,
        placed_at: NaiveDateTime,
    ) -> Result<NewOrder, ValidationError> {
        self.validate(cart)?;
        let customer_id = self.customer_id.ok_or(ValidationError::MissingCustomer)?;

        Ok(NewOrder {
            customer_id,
            table_no: self.table_no,
            amount: cart.total(),
            date: placed_at.date(),
            time: truncate_to_minute(placed_at.time()),
            dishes: cart.to_line_items(),
            status: OrderStatus::placed(),
        })
    }
}

/// A new order as submitted to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub table_no: TableNo,
    pub amount: Money,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub dishes: Vec<LineItem>,
    pub status: OrderStatus,
}

/// A partial update to an existing order. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    /// Line items to add to the order.
    pub dishes: Option<Vec<LineItem>>,
    pub amount: Option<Money>,
    pub is_served: Option<bool>,
    pub is_paid: Option<bool>,
}

impl OrderUpdate {
    /// Adds the cart's dishes to an open order.
    ///
    /// New items restart preparation, so the update also clears the serving flag.
    pub fn add_dishes(cart: &Cart) -> Result<Self, ValidationError> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        Ok(Self {
            dishes: Some(cart.to_line_items()),
            is_served: Some(false),
            ..Self::default()
        })
    }

    /// Marks the order as paid.
    pub fn mark_paid() -> Self {
        Self {
            is_paid: Some(true),
            ..Self::default()
        }
    }

    /// Marks the order as served.
    pub fn mark_served() -> Self {
        Self {
            is_served: Some(true),
            ..Self::default()
        }
    }
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dish;

    fn cart_with(id: &str, price: i64, quantity: u32) -> Cart {
        let mut cart = Cart::new();
        cart.add_item(Dish::new(id, "Dish", Money::from_major(price)), quantity);
        cart
    }

    fn placed_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(20, 15, 42)
            .unwrap()
    }

    #[test]
    fn test_empty_cart_fails_first() {
        let cmd = PlaceOrder::new("", None);
        assert_eq!(cmd.validate(&Cart::new()), Err(ValidationError::EmptyCart));
    }

    #[test]
    fn test_blank_table_fails() {
        let cmd = PlaceOrder::new("  ", Some(CustomerId::new("C1")));
        assert_eq!(
            cmd.validate(&cart_with("D1", 100, 1)),
            Err(ValidationError::MissingTableNumber)
        );
    }

    #[test]
    fn test_missing_or_blank_customer_fails() {
        let cart = cart_with("D1", 100, 1);
        assert_eq!(
            PlaceOrder::new("5", None).validate(&cart),
            Err(ValidationError::MissingCustomer)
        );
        assert_eq!(
            PlaceOrder::new("5", Some(CustomerId::new(""))).validate(&cart),
            Err(ValidationError::MissingCustomer)
        );
    }

    #[test]
    fn test_new_order_amount_and_stamp() {
        let cart = cart_with("D1", 100, 2);
        let order = PlaceOrder::new("5", Some(CustomerId::new("C1")))
            .into_new_order(&cart, placed_at())
            .unwrap();

        assert_eq!(order.amount, Money::from_major(200));
        assert_eq!(order.date.to_string(), "2025-03-14");
        assert_eq!(order.time.format("%H:%M:%S").to_string(), "20:15:00");
        assert_eq!(order.status, OrderStatus::placed());
        assert_eq!(order.dishes.len(), 1);
        assert_eq!(order.dishes[0].quantity, 2);
    }

    #[test]
    fn test_add_dishes_resets_serving() {
        let update = OrderUpdate::add_dishes(&cart_with("D2", 50, 1)).unwrap();
        assert_eq!(update.is_served, Some(false));
        assert_eq!(update.is_paid, None);
        assert_eq!(update.dishes.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_add_dishes_requires_items() {
        assert_eq!(
            OrderUpdate::add_dishes(&Cart::new()),
            Err(ValidationError::EmptyCart)
        );
    }
}
