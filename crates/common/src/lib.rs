//! Shared identifier types for the dine-in ordering client.

mod types;

pub use types::{CustomerId, DishId, OrderRef, TableNo};
