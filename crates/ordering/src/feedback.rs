//! Feedback on a finished order.

use std::sync::Arc;

use common::{CustomerId, OrderRef};
use domain::{Feedback, NewFeedback};

use crate::backend::RestaurantBackend;
use crate::error::Result;

pub struct FeedbackService<B: RestaurantBackend> {
    backend: Arc<B>,
}

impl<B: RestaurantBackend> FeedbackService<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Validates and submits feedback for an order.
    ///
    /// Blank text is rejected before any request is made.
    #[tracing::instrument(skip(self, text), fields(order_id = %order_id))]
    pub async fn submit(
        &self,
        order_id: OrderRef,
        customer_id: CustomerId,
        text: &str,
    ) -> Result<Feedback> {
        let feedback = NewFeedback::new(order_id, customer_id, text)?;
        let stored = self.backend.submit_feedback(feedback).await?;
        tracing::info!("feedback submitted");
        Ok(stored)
    }

    pub async fn for_order(&self, order_id: &OrderRef) -> Result<Vec<Feedback>> {
        Ok(self.backend.feedback_for_order(order_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use domain::ValidationError;

    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::error::OrderError;

    #[tokio::test]
    async fn test_submit_and_list() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = FeedbackService::new(backend);
        let order = OrderRef::new("ORD-0001");

        let stored = service
            .submit(order.clone(), CustomerId::new("C1"), "  Loved the dal ")
            .await
            .unwrap();
        assert_eq!(stored.text, "Loved the dal");

        let listed = service.for_order(&order).await.unwrap();
        assert_eq!(listed, vec![stored]);
    }

    #[tokio::test]
    async fn test_blank_feedback_never_reaches_backend() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = FeedbackService::new(backend.clone());

        let result = service
            .submit(OrderRef::new("ORD-0001"), CustomerId::new("C1"), "   ")
            .await;

        assert_eq!(
            result,
            Err(OrderError::Validation(ValidationError::EmptyFeedback))
        );
        assert_eq!(backend.total_calls(), 0);
    }
}
