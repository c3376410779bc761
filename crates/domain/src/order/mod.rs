//! Orders: lifecycle status, backend records, and commands.

mod commands;
mod record;
mod status;

pub use commands::{NewOrder, OrderUpdate, PlaceOrder};
pub use record::{LineItem, Order};
pub use status::{OrderPhase, OrderStatus};
