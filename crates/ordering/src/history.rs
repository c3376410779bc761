//! A customer's past orders.

use std::sync::Arc;

use common::CustomerId;
use domain::{Money, Order};

use crate::backend::RestaurantBackend;
use crate::error::Result;

/// Totals over a customer's order history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistorySummary {
    pub total_orders: usize,
    pub served_orders: usize,
    pub paid_orders: usize,
    pub open_orders: usize,
    /// Sum of the amounts of every order, open or paid.
    pub total_amount: Money,
}

impl HistorySummary {
    /// Computes the summary for a set of orders.
    pub fn from_orders(orders: &[Order]) -> Self {
        orders.iter().fold(Self::default(), |mut summary, order| {
            summary.total_orders += 1;
            if order.status.is_served {
                summary.served_orders += 1;
            }
            if order.status.is_paid {
                summary.paid_orders += 1;
            } else {
                summary.open_orders += 1;
            }
            summary.total_amount += order.amount;
            summary
        })
    }
}

/// Read access to the orders a customer has placed.
pub struct OrderHistory<B: RestaurantBackend> {
    backend: Arc<B>,
}

impl<B: RestaurantBackend> OrderHistory<B> {
    /// Creates a history view over the given backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Returns the customer's orders, newest first.
    ///
    /// If the per-customer listing is unavailable, the full order list is
    /// fetched and filtered instead.
    #[tracing::instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn orders_for(&self, customer_id: &CustomerId) -> Result<Vec<Order>> {
        let mut orders = match self.backend.orders_for_customer(customer_id).await {
            Ok(orders) => orders,
            Err(e) => {
                tracing::debug!(error = %e, "customer listing unavailable, filtering all orders");
                self.backend
                    .list_orders()
                    .await?
                    .into_iter()
                    .filter(|order| &order.customer_id == customer_id)
                    .collect()
            }
        };

        newest_first(&mut orders);
        Ok(orders)
    }

    /// Returns the customer's most recent order, if any.
    pub async fn latest(&self, customer_id: &CustomerId) -> Result<Option<Order>> {
        Ok(self.orders_for(customer_id).await?.into_iter().next())
    }

    /// Returns the customer's most recent order that is not yet paid.
    pub async fn latest_open(&self, customer_id: &CustomerId) -> Result<Option<Order>> {
        Ok(self
            .orders_for(customer_id)
            .await?
            .into_iter()
            .find(Order::is_open))
    }

    /// Returns totals over the customer's orders.
    pub async fn summary(&self, customer_id: &CustomerId) -> Result<HistorySummary> {
        let orders = self.orders_for(customer_id).await?;
        Ok(HistorySummary::from_orders(&orders))
    }
}

/// Sorts by placement date, then time, latest first. Undated orders go last.
fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.placed_key().cmp(&a.placed_key()));
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use common::{OrderRef, TableNo};
    use domain::OrderStatus;

    use super::*;
    use crate::backend::InMemoryBackend;

    fn order(id: &str, customer: &str, date: (i32, u32, u32), time: (u32, u32)) -> Order {
        Order {
            id: OrderRef::new(id),
            customer_id: CustomerId::new(customer),
            table_no: TableNo::new("5"),
            amount: Money::from_major(100),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
            time: NaiveTime::from_hms_opt(time.0, time.1, 0),
            dishes: Vec::new(),
            status: OrderStatus::placed(),
        }
    }

    #[test]
    fn test_newest_first_orders_by_date_then_time() {
        let mut orders = vec![
            order("A", "C1", (2025, 3, 14), (21, 0)),
            order("B", "C1", (2025, 3, 15), (9, 0)),
            order("C", "C1", (2025, 3, 15), (13, 30)),
        ];
        newest_first(&mut orders);

        let ids: Vec<_> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["C", "B", "A"]);
    }

    #[test]
    fn test_summary_counts() {
        let mut served = order("A", "C1", (2025, 3, 14), (20, 0));
        served.status = OrderStatus::new(true, true);
        let open = order("B", "C1", (2025, 3, 15), (20, 0));

        let summary = HistorySummary::from_orders(&[served, open]);
        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.served_orders, 1);
        assert_eq!(summary.paid_orders, 1);
        assert_eq!(summary.open_orders, 1);
        assert_eq!(summary.total_amount, Money::from_major(200));
    }

    #[tokio::test]
    async fn test_latest_open_skips_paid_orders() {
        let backend = Arc::new(InMemoryBackend::new());
        let mut paid = order("NEW", "C1", (2025, 3, 16), (20, 0));
        paid.status = OrderStatus::new(true, true);
        backend.insert_order(paid);
        backend.insert_order(order("OLD", "C1", (2025, 3, 15), (20, 0)));
        backend.insert_order(order("OTHER", "C2", (2025, 3, 17), (20, 0)));

        let history = OrderHistory::new(backend);
        let customer = CustomerId::new("C1");

        let latest = history.latest(&customer).await.unwrap().unwrap();
        assert_eq!(latest.id.as_str(), "NEW");
        let open = history.latest_open(&customer).await.unwrap().unwrap();
        assert_eq!(open.id.as_str(), "OLD");
    }

    #[tokio::test]
    async fn test_falls_back_to_filtering_all_orders() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.insert_order(order("A", "C1", (2025, 3, 14), (20, 0)));
        backend.insert_order(order("B", "C2", (2025, 3, 14), (20, 0)));
        backend.set_failing("orders_for_customer", true);

        let history = OrderHistory::new(backend.clone());
        let orders = history.orders_for(&CustomerId::new("C1")).await.unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id.as_str(), "A");
        assert_eq!(backend.call_count("list_orders"), 1);
    }

    #[tokio::test]
    async fn test_fallback_failure_is_reported() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.set_failing("orders_for_customer", true);
        backend.set_failing("list_orders", true);

        let history = OrderHistory::new(backend);
        assert!(history.orders_for(&CustomerId::new("C1")).await.is_err());
    }
}
