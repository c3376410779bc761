//! Periodic status checks for an open order.
//!
//! A [`StatusPoller`] runs at most one polling cycle at a time. Each cycle
//! checks the order immediately, then keeps checking on a timer until the
//! order is paid, a check fails, or the cycle is stopped. Once the kitchen
//! has served the order the cycle slows down, since the only change left to
//! observe is the payment.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use common::OrderRef;
use domain::{Order, OrderStatus};
use tokio_util::sync::CancellationToken;

use crate::backend::RestaurantBackend;

/// Factor applied to the base interval while an order awaits payment.
pub const SLOW_POLL_FACTOR: u32 = 4;

/// One delivered status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub order_ref: OrderRef,
    pub status: OrderStatus,
    /// The full order as returned by the backend.
    pub order: Order,
}

impl From<Order> for StatusUpdate {
    fn from(order: Order) -> Self {
        Self {
            order_ref: order.id.clone(),
            status: order.status,
            order,
        }
    }
}

/// Handle to a polling cycle.
///
/// Cloning the handle does not start another cycle; every clone controls the
/// same one.
#[derive(Debug, Clone)]
pub struct PollHandle {
    token: CancellationToken,
}

impl PollHandle {
    /// Stops the cycle. Calling it again, or after the cycle ended, is a no-op.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Returns true until the cycle is stopped or ends on its own.
    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }
}

/// Returns the delay before the check that follows `status`.
pub fn next_delay(status: &OrderStatus, base_interval: Duration) -> Duration {
    if status.awaiting_payment() {
        base_interval * SLOW_POLL_FACTOR
    } else {
        base_interval
    }
}

/// Polls the backend for the status of one order at a time.
pub struct StatusPoller<B: RestaurantBackend> {
    backend: Arc<B>,
    active: Mutex<Option<PollHandle>>,
}

impl<B: RestaurantBackend + 'static> StatusPoller<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            active: Mutex::new(None),
        }
    }

    /// Starts polling `order_ref`, cancelling any cycle already running.
    ///
    /// The first check happens right away. Must be called from within a Tokio
    /// runtime.
    pub fn start<F>(&self, order_ref: OrderRef, on_update: F, base_interval: Duration) -> PollHandle
    where
        F: Fn(&StatusUpdate) + Send + Sync + 'static,
    {
        let token = CancellationToken::new();
        let handle = PollHandle {
            token: token.clone(),
        };

        if let Some(previous) = self.active().replace(handle.clone()) {
            previous.stop();
        }

        tracing::debug!(order_id = %order_ref, ?base_interval, "status polling started");
        tokio::spawn(poll_loop(
            Arc::clone(&self.backend),
            order_ref,
            on_update,
            base_interval,
            token,
        ));

        handle
    }

    /// Stops the active cycle, if any.
    pub fn stop(&self) {
        if let Some(handle) = self.active().take() {
            handle.stop();
        }
    }

    /// Returns true if a cycle is currently running.
    pub fn is_running(&self) -> bool {
        self.active().as_ref().is_some_and(PollHandle::is_running)
    }

    fn active(&self) -> MutexGuard<'_, Option<PollHandle>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B: RestaurantBackend> Drop for StatusPoller<B> {
    fn drop(&mut self) {
        let active = self.active.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = active.take() {
            handle.stop();
        }
    }
}

async fn poll_loop<B, F>(
    backend: Arc<B>,
    order_ref: OrderRef,
    on_update: F,
    base_interval: Duration,
    token: CancellationToken,
) where
    B: RestaurantBackend,
    F: Fn(&StatusUpdate),
{
    loop {
        let result = backend.fetch_order(&order_ref).await;

        // A stopped cycle must not deliver the answer to a check it started earlier.
        if token.is_cancelled() {
            break;
        }

        let delay = match result {
            Ok(order) => {
                let update = StatusUpdate::from(order);
                on_update(&update);

                if update.status.is_paid {
                    tracing::info!(order_id = %order_ref, "order paid, status polling finished");
                    token.cancel();
                    break;
                }
                next_delay(&update.status, base_interval)
            }
            Err(e) => {
                tracing::warn!(order_id = %order_ref, error = %e, "status check failed, polling stopped");
                token.cancel();
                break;
            }
        };

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    tracing::debug!(order_id = %order_ref, "status polling stopped");
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use common::{CustomerId, TableNo};
    use domain::Money;

    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::error::RemoteError;

    const BASE: Duration = Duration::from_secs(10);

    fn backend_with_order() -> (Arc<InMemoryBackend>, OrderRef) {
        let backend = Arc::new(InMemoryBackend::new());
        let order_ref = OrderRef::new("ORD-0001");
        backend.insert_order(Order {
            id: order_ref.clone(),
            customer_id: CustomerId::new("C1"),
            table_no: TableNo::new("5"),
            amount: Money::from_major(200),
            date: NaiveDate::from_ymd_opt(2025, 3, 14),
            time: None,
            dishes: Vec::new(),
            status: OrderStatus::placed(),
        });
        (backend, order_ref)
    }

    fn recorder() -> (
        Arc<Mutex<Vec<OrderStatus>>>,
        impl Fn(&StatusUpdate) + Send + Sync + 'static,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |update: &StatusUpdate| {
            sink.lock().unwrap().push(update.status)
        })
    }

    async fn advance(duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    #[test]
    fn test_next_delay() {
        assert_eq!(next_delay(&OrderStatus::placed(), BASE), BASE);
        assert_eq!(next_delay(&OrderStatus::new(true, false), BASE), BASE * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_check_is_immediate_then_periodic() {
        let (backend, order_ref) = backend_with_order();
        let poller = StatusPoller::new(backend.clone());
        let (seen, on_update) = recorder();

        let handle = poller.start(order_ref, on_update, BASE);

        advance(Duration::from_millis(1)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);

        advance(BASE).await;
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert!(handle.is_running());
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_slows_down_once_served_and_speeds_up_after_amend() {
        let (backend, order_ref) = backend_with_order();
        backend.script_statuses(
            &order_ref,
            [
                Ok(OrderStatus::new(true, false)),
                Ok(OrderStatus::placed()),
                Ok(OrderStatus::placed()),
            ],
        );
        let poller = StatusPoller::new(backend.clone());
        let (seen, on_update) = recorder();

        let handle = poller.start(order_ref, on_update, BASE);
        advance(Duration::from_millis(1)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);

        // Served: the next check waits four base intervals.
        advance(BASE * 3).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
        advance(BASE).await;
        assert_eq!(seen.lock().unwrap().len(), 2);

        // Unserved again: back to the base interval.
        advance(BASE).await;
        assert_eq!(seen.lock().unwrap().len(), 3);
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_paid_result_is_delivered_and_ends_cycle() {
        let (backend, order_ref) = backend_with_order();
        backend.script_statuses(
            &order_ref,
            [Ok(OrderStatus::placed()), Ok(OrderStatus::new(true, true))],
        );
        let poller = StatusPoller::new(backend.clone());
        let (seen, on_update) = recorder();

        let handle = poller.start(order_ref, on_update, BASE);
        advance(BASE + Duration::from_millis(1)).await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![OrderStatus::placed(), OrderStatus::new(true, true)]
        );
        assert!(!handle.is_running());
        assert!(!poller.is_running());

        advance(BASE * 10).await;
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(backend.call_count("fetch_order"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_check_stops_without_delivery() {
        let (backend, order_ref) = backend_with_order();
        backend.script_statuses(&order_ref, [Err(RemoteError::Transport("timeout".into()))]);
        let poller = StatusPoller::new(backend.clone());
        let (seen, on_update) = recorder();

        let handle = poller.start(order_ref, on_update, BASE);
        advance(BASE * 3).await;

        assert!(seen.lock().unwrap().is_empty());
        assert!(!handle.is_running());
        assert_eq!(backend.call_count("fetch_order"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_checks() {
        let (backend, order_ref) = backend_with_order();
        let poller = StatusPoller::new(backend.clone());
        let (seen, on_update) = recorder();

        let handle = poller.start(order_ref, on_update, BASE);
        advance(Duration::from_millis(1)).await;
        handle.stop();
        handle.stop();

        advance(BASE * 5).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(backend.call_count("fetch_order"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_replaces_previous_cycle() {
        let (backend, order_ref) = backend_with_order();
        let poller = StatusPoller::new(backend.clone());
        let (first_seen, first) = recorder();
        let (second_seen, second) = recorder();

        let first_handle = poller.start(order_ref.clone(), first, BASE);
        let second_handle = poller.start(order_ref, second, BASE);
        advance(BASE + Duration::from_millis(1)).await;

        assert!(!first_handle.is_running());
        assert!(second_handle.is_running());
        assert!(first_seen.lock().unwrap().is_empty());
        assert_eq!(second_seen.lock().unwrap().len(), 2);
        poller.stop();
        assert!(!second_handle.is_running());
    }
}
