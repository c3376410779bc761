//! Order lifecycle controller.
//!
//! Drives one dine-in session through `NoOrder → Placed → Served → Paid`,
//! keeping the persisted session in step with what the backend reports.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{CustomerId, OrderRef};
use domain::{
    Cart, Order, OrderPhase, OrderStatus, OrderUpdate, PlaceOrder, SessionCart, TableAssignment,
    ValidationError,
};
use session_store::SessionStore;

use crate::backend::RestaurantBackend;
use crate::error::{OrderError, PreconditionError, RemoteError, Result};
use crate::history::OrderHistory;
use crate::poller::{PollHandle, StatusPoller, StatusUpdate};
use crate::session::CustomerSession;
use crate::state;

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: OrderPhase,
    pub order_ref: Option<OrderRef>,
    pub status: Option<OrderStatus>,
    pub cart: Cart,
}

/// Marks a mutating request as in flight until dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> std::result::Result<Self, PreconditionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| PreconditionError::RequestInFlight)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Coordinates the cart, the open order, and status polling for one session.
///
/// All state lives in the session store, so a controller built over the same
/// store after a restart picks up where the previous one left off once
/// [`restore`](Self::restore) has reconciled it with the backend.
pub struct OrderLifecycleController<S, B>
where
    S: SessionStore + 'static,
    B: RestaurantBackend + 'static,
{
    store: Arc<S>,
    backend: Arc<B>,
    cart: Arc<SessionCart<Arc<S>>>,
    customer: CustomerSession<S, B>,
    history: OrderHistory<B>,
    poller: StatusPoller<B>,
    in_flight: AtomicBool,
}

impl<S, B> OrderLifecycleController<S, B>
where
    S: SessionStore + 'static,
    B: RestaurantBackend + 'static,
{
    /// Creates a controller over a session store and a backend.
    ///
    /// The cart is loaded from the store; the open order is not verified
    /// until [`restore`](Self::restore) is called.
    pub fn new(store: Arc<S>, backend: Arc<B>) -> Self {
        Self {
            cart: Arc::new(SessionCart::load(Arc::clone(&store))),
            customer: CustomerSession::new(Arc::clone(&store), Arc::clone(&backend)),
            history: OrderHistory::new(Arc::clone(&backend)),
            poller: StatusPoller::new(Arc::clone(&backend)),
            in_flight: AtomicBool::new(false),
            store,
            backend,
        }
    }

    /// The cart being assembled for the next order or amendment.
    pub fn cart(&self) -> &SessionCart<Arc<S>> {
        &self.cart
    }

    /// The signed-in customer.
    pub fn customer(&self) -> &CustomerSession<S, B> {
        &self.customer
    }

    /// The customer's past orders.
    pub fn history(&self) -> &OrderHistory<B> {
        &self.history
    }

    /// Returns the open order reference, if any.
    pub fn current_order(&self) -> Option<OrderRef> {
        state::current_order(&*self.store)
    }

    /// Returns the current phase, open order, cached status and cart.
    pub fn snapshot(&self) -> SessionSnapshot {
        let (order_ref, status) = self.open_order();
        SessionSnapshot {
            phase: OrderPhase::from_status(status),
            order_ref,
            status,
            cart: self.cart.snapshot(),
        }
    }

    /// The open order with its cached status; an order with no cached status
    /// counts as just placed.
    fn open_order(&self) -> (Option<OrderRef>, Option<OrderStatus>) {
        let order_ref = self.current_order();
        let status = order_ref
            .as_ref()
            .map(|_| state::cached_status(&*self.store).unwrap_or_else(OrderStatus::placed));
        (order_ref, status)
    }

    /// Submits the cart as a new order.
    ///
    /// A missing customer id is taken from the signed-in customer. Nothing is
    /// sent unless the cart, table and customer are all present. On success
    /// the order becomes the open order and the submitted dishes leave the
    /// cart; on failure the cart is left as it was.
    #[tracing::instrument(skip(self, command), fields(table_no = %command.table_no))]
    pub async fn place_order(&self, command: PlaceOrder) -> Result<Order> {
        let command = PlaceOrder {
            customer_id: command
                .customer_id
                .or_else(|| self.customer.current_customer().map(|c| c.id)),
            ..command
        };
        let cart = self.cart.snapshot();
        command.validate(&cart)?;

        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let (open, status) = self.open_order();
        if let Some(open) = open.filter(|_| !OrderPhase::from_status(status).can_place()) {
            return Err(PreconditionError::OrderAlreadyOpen(open).into());
        }

        let placed_at = chrono::Local::now().naive_local();
        let new_order = command.into_new_order(&cart, placed_at)?;
        let amount = new_order.amount;

        let order = self
            .backend
            .create_order(new_order)
            .await
            .map_err(|e| remote_failure("place_order", e))?;

        state::record_order(&*self.store, &order.id, OrderStatus::placed());
        self.cart.remove_ordered(&cart);

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(order_id = %order.id, %amount, "order placed");
        Ok(order)
    }

    /// Adds the cart's contents to the open order.
    ///
    /// The order goes back to unserved since the kitchen has new dishes to
    /// prepare. On failure the cart is left as it was.
    #[tracing::instrument(skip(self))]
    pub async fn add_items_to_open_order(&self) -> Result<OrderRef> {
        let (order_ref, status) = self.open_order();
        let order_ref = order_ref
            .filter(|_| OrderPhase::from_status(status).can_amend())
            .ok_or(ValidationError::MissingOrder)?;
        let cart = self.cart.snapshot();
        let update = OrderUpdate::add_dishes(&cart)?;

        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        self.backend
            .update_order(&order_ref, update)
            .await
            .map_err(|e| remote_failure("add_items_to_open_order", e))?;

        let mut status = state::cached_status(&*self.store).unwrap_or_else(OrderStatus::placed);
        status.is_served = false;
        state::record_status(&*self.store, status);
        self.cart.remove_ordered(&cart);

        metrics::counter!("order_amendments_total").increment(1);
        tracing::info!(order_id = %order_ref, dishes = cart.len(), "items added to order");
        Ok(order_ref)
    }

    /// Fetches the open order and records its status.
    ///
    /// A paid order ends the session's order: it is forgotten along with the
    /// cart.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_status(&self) -> Result<StatusUpdate> {
        let order_ref = self.current_order().ok_or(ValidationError::MissingOrder)?;
        let order = self
            .backend
            .fetch_order(&order_ref)
            .await
            .map_err(|e| remote_failure("refresh_status", e))?;

        let update = StatusUpdate::from(order);
        apply_update(&*self.store, &self.cart, &update);
        Ok(update)
    }

    /// Settles the bill for the open order.
    ///
    /// The backend's view of the order decides whether payment is allowed:
    /// an unserved order is refused without sending anything, and an order
    /// that is already paid is accepted without paying twice. Afterwards the
    /// table is released and the session returns to `NoOrder`.
    #[tracing::instrument(skip(self))]
    pub async fn process_payment(&self) -> Result<Order> {
        let order_ref = self.current_order().ok_or(ValidationError::MissingOrder)?;
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        // 1. Confirm the order is served
        let mut order = self
            .backend
            .fetch_order(&order_ref)
            .await
            .map_err(|e| remote_failure("process_payment", e))?;

        let phase = order.phase();
        if phase.is_terminal() {
            tracing::info!(order_id = %order_ref, "order already paid");
        } else {
            if !phase.can_pay() {
                state::record_status(&*self.store, order.status);
                return Err(PreconditionError::NotServed.into());
            }

            // 2. Pay
            self.backend
                .update_order(&order_ref, OrderUpdate::mark_paid())
                .await
                .map_err(|e| remote_failure("process_payment", e))?;
            order.status.is_paid = true;

            metrics::counter!("payments_total").increment(1);
            tracing::info!(order_id = %order_ref, amount = %order.amount, "payment processed");
        }

        // 3. Release the table and close the session's order
        if let Err(e) = self
            .backend
            .update_table(&order.table_no, TableAssignment::Release)
            .await
        {
            tracing::warn!(table_no = %order.table_no, error = %e, "failed to release table");
        }

        self.poller.stop();
        close_order(&*self.store, &self.cart);
        Ok(order)
    }

    /// Reconciles the persisted session with the backend.
    ///
    /// A remembered order is re-fetched: if it was paid elsewhere or no longer
    /// exists it is forgotten. Without a remembered order, the customer's most
    /// recent unpaid order is adopted. Backend failures leave the session as
    /// it was. Returns the open order if one was confirmed.
    #[tracing::instrument(skip(self))]
    pub async fn restore(&self, customer_id: Option<&CustomerId>) -> Option<Order> {
        if let Some(order_ref) = self.current_order() {
            return match self.backend.fetch_order(&order_ref).await {
                Ok(order) if order.phase().is_terminal() => {
                    tracing::info!(order_id = %order_ref, "remembered order was paid, discarding");
                    close_order(&*self.store, &self.cart);
                    None
                }
                Ok(order) => {
                    state::record_status(&*self.store, order.status);
                    Some(order)
                }
                Err(RemoteError::NotFound(_)) => {
                    tracing::info!(order_id = %order_ref, "remembered order no longer exists");
                    state::forget_order(&*self.store);
                    None
                }
                Err(e) => {
                    tracing::warn!(order_id = %order_ref, error = %e, "could not verify remembered order");
                    None
                }
            };
        }

        let customer_id = customer_id
            .cloned()
            .or_else(|| self.customer.current_customer().map(|c| c.id))?;

        match self.history.latest_open(&customer_id).await {
            Ok(Some(order)) => {
                tracing::info!(order_id = %order.id, "adopted open order");
                state::record_order(&*self.store, &order.id, order.status);
                Some(order)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not look up open orders");
                None
            }
        }
    }

    /// Starts polling the open order.
    ///
    /// Each update is recorded in the session before `on_update` sees it. Any
    /// earlier polling cycle is stopped.
    pub fn start_polling<F>(&self, on_update: F, base_interval: Duration) -> Result<PollHandle>
    where
        F: Fn(&StatusUpdate) + Send + Sync + 'static,
    {
        let order_ref = self.current_order().ok_or(ValidationError::MissingOrder)?;
        let store = Arc::clone(&self.store);
        let cart = Arc::clone(&self.cart);

        Ok(self.poller.start(
            order_ref,
            move |update| {
                apply_update(&*store, &cart, update);
                on_update(update);
            },
            base_interval,
        ))
    }

    pub fn stop_polling(&self) {
        self.poller.stop();
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// Signs out: stops polling, empties the cart, releases the customer's
    /// tables and clears the session.
    pub async fn end_session(&self) {
        self.poller.stop();
        self.cart.clear();
        self.customer.end().await;
    }
}

/// Records a fetched status if it belongs to the open order.
fn apply_update<S: SessionStore>(store: &S, cart: &SessionCart<Arc<S>>, update: &StatusUpdate) {
    if state::current_order(store).as_ref() != Some(&update.order_ref) {
        tracing::debug!(order_id = %update.order_ref, "ignoring status of an order no longer open");
        return;
    }

    if update.status.phase().is_terminal() {
        tracing::info!(order_id = %update.order_ref, "order paid");
        close_order(store, cart);
    } else {
        state::record_status(store, update.status);
    }
}

/// Returns the session to `NoOrder` after payment.
fn close_order<S: SessionStore>(store: &S, cart: &SessionCart<Arc<S>>) {
    state::forget_order(store);
    cart.clear();
}

fn remote_failure(operation: &'static str, error: RemoteError) -> OrderError {
    metrics::counter!("order_remote_failures_total", "operation" => operation).increment(1);
    tracing::warn!(operation, error = %error, "backend request failed");
    error.into()
}
