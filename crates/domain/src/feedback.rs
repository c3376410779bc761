//! Customer feedback on an order.

use common::{CustomerId, OrderRef};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Feedback as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Backend-assigned identifier, when the backend returns one.
    pub id: Option<String>,
    pub order_id: OrderRef,
    pub customer_id: CustomerId,
    pub text: String,
}

/// Feedback ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub order_id: OrderRef,
    pub customer_id: CustomerId,
    pub text: String,
}

impl NewFeedback {
    /// Validates and trims the feedback.
    pub fn new(
        order_id: OrderRef,
        customer_id: CustomerId,
        text: &str,
    ) -> Result<Self, ValidationError> {
        if order_id.is_blank() {
            return Err(ValidationError::MissingOrder);
        }
        if customer_id.is_blank() {
            return Err(ValidationError::MissingCustomer);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyFeedback);
        }

        Ok(Self {
            order_id,
            customer_id,
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_trimmed() {
        let fb = NewFeedback::new(OrderRef::new("O1"), CustomerId::new("C1"), "  lovely dal \n")
            .unwrap();
        assert_eq!(fb.text, "lovely dal");
    }

    #[test]
    fn test_blank_text_rejected() {
        let err = NewFeedback::new(OrderRef::new("O1"), CustomerId::new("C1"), "   ").unwrap_err();
        assert_eq!(err, ValidationError::EmptyFeedback);
    }

    #[test]
    fn test_missing_ids_rejected() {
        assert_eq!(
            NewFeedback::new(OrderRef::new(""), CustomerId::new("C1"), "ok").unwrap_err(),
            ValidationError::MissingOrder
        );
        assert_eq!(
            NewFeedback::new(OrderRef::new("O1"), CustomerId::new(""), "ok").unwrap_err(),
            ValidationError::MissingCustomer
        );
    }
}
