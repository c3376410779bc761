//! Domain layer for the dine-in ordering client.
//!
//! This crate provides the core domain types including:
//! - Menu dishes and money amounts
//! - The cart value type and the session-persisted cart aggregate
//! - Order records, commands, and the lifecycle state machine
//! - Tables, customers, and feedback
//! - The keys and lifetimes of persisted session values

pub mod cart;
pub mod customer;
pub mod dish;
pub mod error;
pub mod feedback;
pub mod money;
pub mod order;
pub mod session;
pub mod session_cart;
pub mod table;

pub use cart::{Cart, CartItem};
pub use common::{CustomerId, DishId, OrderRef, TableNo};
pub use customer::{Customer, CustomerUpdate, NewCustomer};
pub use dish::Dish;
pub use error::ValidationError;
pub use feedback::{Feedback, NewFeedback};
pub use money::Money;
pub use order::{LineItem, NewOrder, Order, OrderPhase, OrderStatus, OrderUpdate, PlaceOrder};
pub use session::SessionKey;
pub use session_cart::SessionCart;
pub use table::{Table, TableAssignment};
