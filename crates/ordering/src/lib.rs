//! Ordering core for the dine-in client.
//!
//! This crate drives a table's order from cart to payment:
//! 1. Place the cart as a new order
//! 2. Add more dishes to the open order
//! 3. Watch the order's status until the kitchen serves it
//! 4. Pay, which releases the table and clears the session's order
//!
//! The backend is reached through the [`RestaurantBackend`] trait; session
//! state is kept in a [`session_store::SessionStore`].

pub mod backend;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod feedback;
pub mod history;
pub mod poller;
pub mod session;
mod state;

pub use backend::{InMemoryBackend, RestaurantBackend};
pub use catalog::Catalog;
pub use controller::{OrderLifecycleController, SessionSnapshot};
pub use error::{ErrorKind, OrderError, PreconditionError, RemoteError, Result};
pub use feedback::FeedbackService;
pub use history::{HistorySummary, OrderHistory};
pub use poller::{PollHandle, SLOW_POLL_FACTOR, StatusPoller, StatusUpdate, next_delay};
pub use session::CustomerSession;
