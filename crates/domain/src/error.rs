//! Domain error types.

use thiserror::Error;

/// A request that cannot be sent because the caller left something out.
///
/// These are never retried; the message is meant to be shown as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The cart has no items.
    #[error("Your cart is empty")]
    EmptyCart,

    /// No table number was given.
    #[error("Table number is required")]
    MissingTableNumber,

    /// No customer is logged in.
    #[error("Customer ID is required")]
    MissingCustomer,

    /// The session has no open order to act on.
    #[error("There is no open order")]
    MissingOrder,

    /// Feedback text is empty.
    #[error("Feedback cannot be empty")]
    EmptyFeedback,

    /// A sign-up without a name.
    #[error("Name is required")]
    MissingName,

    /// The email address is missing or malformed.
    #[error("A valid email address is required")]
    InvalidEmail,

    /// A sign-up without a password.
    #[error("Password is required")]
    MissingPassword,

    /// A profile update with nothing to change.
    #[error("Nothing to update")]
    EmptyProfileUpdate,
}
