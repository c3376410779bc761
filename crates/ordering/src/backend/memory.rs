//! In-memory restaurant backend.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use common::{CustomerId, OrderRef, TableNo};
use domain::{
    Customer, CustomerUpdate, Dish, Feedback, LineItem, NewCustomer, NewFeedback, NewOrder, Order,
    OrderStatus, OrderUpdate, Table, TableAssignment,
};

use super::RestaurantBackend;
use crate::error::RemoteError;

#[derive(Debug, Default)]
struct InMemoryBackendState {
    dishes: Vec<Dish>,
    tables: BTreeMap<TableNo, Table>,
    orders: BTreeMap<OrderRef, Order>,
    feedback: Vec<Feedback>,
    accounts: HashMap<String, (String, Customer)>,
    scripted_statuses: HashMap<OrderRef, VecDeque<Result<OrderStatus, RemoteError>>>,
    failing: HashSet<&'static str>,
    calls: HashMap<&'static str, usize>,
    latency: Option<Duration>,
    next_order: u32,
    next_feedback: u32,
    next_customer: u32,
}

/// In-memory restaurant backend for tests and offline demos.
///
/// Individual operations can be made to fail with a transport error, and the
/// number of calls to each operation is recorded. Operation names match the
/// [`RestaurantBackend`] method names.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<RwLock<InMemoryBackendState>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dish to the menu.
    pub fn add_dish(&self, dish: Dish) {
        self.write().dishes.push(dish);
    }

    /// Adds a free table.
    pub fn add_table(&self, table_no: impl Into<TableNo>) {
        let table_no = table_no.into();
        self.write().tables.insert(
            table_no.clone(),
            Table {
                table_no,
                customer_id: None,
                order_id: None,
            },
        );
    }

    /// Registers a customer account that can log in.
    pub fn add_account(&self, email: &str, password: &str, customer: Customer) {
        self.write()
            .accounts
            .insert(email.to_string(), (password.to_string(), customer));
    }

    /// Returns the customer with an account under `customer_id`, bypassing
    /// call counting and failures.
    pub fn customer(&self, customer_id: &CustomerId) -> Option<Customer> {
        self.read()
            .accounts
            .values()
            .map(|(_, customer)| customer)
            .find(|customer| &customer.id == customer_id)
            .cloned()
    }

    /// Stores an order as-is, as if another client had created it.
    pub fn insert_order(&self, order: Order) {
        self.write().orders.insert(order.id.clone(), order);
    }

    /// Returns the stored order, bypassing call counting and failures.
    pub fn order(&self, order_ref: &OrderRef) -> Option<Order> {
        self.read().orders.get(order_ref).cloned()
    }

    /// Returns the stored table, bypassing call counting and failures.
    pub fn table(&self, table_no: &TableNo) -> Option<Table> {
        self.read().tables.get(table_no).cloned()
    }

    /// Returns the number of stored orders.
    pub fn order_count(&self) -> usize {
        self.read().orders.len()
    }

    /// Marks an order served, as the kitchen would.
    pub fn mark_served(&self, order_ref: &OrderRef) {
        if let Some(order) = self.write().orders.get_mut(order_ref) {
            apply_update(order, OrderUpdate::mark_served());
        }
    }

    /// Marks an order paid, as a cashier would.
    pub fn mark_paid(&self, order_ref: &OrderRef) {
        if let Some(order) = self.write().orders.get_mut(order_ref) {
            apply_update(order, OrderUpdate::mark_paid());
        }
    }

    /// Queues outcomes for the next `fetch_order` calls on `order_ref`.
    ///
    /// Each `Ok` status is written to the stored order before it is returned;
    /// each `Err` is returned as-is. Once the queue is drained, fetches read
    /// the stored order normally.
    pub fn script_statuses(
        &self,
        order_ref: &OrderRef,
        outcomes: impl IntoIterator<Item = Result<OrderStatus, RemoteError>>,
    ) {
        self.write()
            .scripted_statuses
            .entry(order_ref.clone())
            .or_default()
            .extend(outcomes);
    }

    /// Makes the named operation fail with a transport error until reset.
    pub fn set_failing(&self, operation: &'static str, fail: bool) {
        let mut state = self.write();
        if fail {
            state.failing.insert(operation);
        } else {
            state.failing.remove(operation);
        }
    }

    /// Delays every response by `latency`, as a slow network would.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.write().latency = latency;
    }

    /// Returns how many times the named operation was called.
    pub fn call_count(&self, operation: &str) -> usize {
        self.read().calls.get(operation).copied().unwrap_or(0)
    }

    /// Returns the total number of calls across all operations.
    pub fn total_calls(&self) -> usize {
        self.read().calls.values().sum()
    }

    async fn respond_after_latency(&self) {
        let latency = self.read().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn enter(
        &self,
        operation: &'static str,
    ) -> Result<RwLockWriteGuard<'_, InMemoryBackendState>, RemoteError> {
        let mut state = self.write();
        *state.calls.entry(operation).or_default() += 1;
        if state.failing.contains(operation) {
            return Err(RemoteError::Transport(format!("{operation}: connection refused")));
        }
        Ok(state)
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryBackendState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryBackendState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Applies a partial update the way the restaurant backend does.
fn apply_update(order: &mut Order, update: OrderUpdate) {
    if let Some(dishes) = update.dishes {
        let added = dishes.iter().map(LineItem::total_price).sum();
        merge_dishes(&mut order.dishes, dishes);
        if update.amount.is_none() {
            order.amount += added;
        }
    }
    if let Some(amount) = update.amount {
        order.amount = amount;
    }
    if let Some(is_served) = update.is_served {
        order.status.is_served = is_served;
    }
    if let Some(is_paid) = update.is_paid {
        order.status.is_paid = is_paid;
    }
}

fn merge_dishes(lines: &mut Vec<LineItem>, added: Vec<LineItem>) {
    for item in added {
        match lines.iter_mut().find(|line| line.dish_id == item.dish_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => lines.push(item),
        }
    }
}

#[async_trait]
impl RestaurantBackend for InMemoryBackend {
    async fn login(&self, email: &str, password: &str) -> Result<Customer, RemoteError> {
        self.respond_after_latency().await;
        let state = self.enter("login")?;
        match state.accounts.get(email) {
            Some((expected, customer)) if expected == password => Ok(customer.clone()),
            _ => Err(RemoteError::Status {
                status: 401,
                message: "Invalid email or password".to_string(),
            }),
        }
    }

    async fn register(&self, customer: NewCustomer) -> Result<(), RemoteError> {
        self.respond_after_latency().await;
        let mut state = self.enter("register")?;
        if state.accounts.contains_key(&customer.email) {
            return Err(RemoteError::Status {
                status: 409,
                message: "Email already registered".to_string(),
            });
        }

        state.next_customer += 1;
        let record = Customer {
            id: CustomerId::new(format!("CUST-{:04}", state.next_customer)),
            name: Some(customer.name),
            email: Some(customer.email.clone()),
            contact_number: customer.contact_number,
        };
        state
            .accounts
            .insert(customer.email, (customer.password, record));
        Ok(())
    }

    async fn fetch_customer(&self, customer_id: &CustomerId) -> Result<Customer, RemoteError> {
        self.respond_after_latency().await;
        let state = self.enter("fetch_customer")?;
        state
            .accounts
            .values()
            .map(|(_, customer)| customer)
            .find(|customer| &customer.id == customer_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("Customer {customer_id}")))
    }

    async fn update_customer(
        &self,
        customer_id: &CustomerId,
        update: CustomerUpdate,
    ) -> Result<(), RemoteError> {
        self.respond_after_latency().await;
        let mut state = self.enter("update_customer")?;
        let email = state
            .accounts
            .iter()
            .find(|(_, (_, customer))| &customer.id == customer_id)
            .map(|(email, _)| email.clone())
            .ok_or_else(|| RemoteError::NotFound(format!("Customer {customer_id}")))?;

        if let Some((password, mut customer)) = state.accounts.remove(&email) {
            customer.apply(&update);
            let key = customer.email.clone().unwrap_or(email);
            state.accounts.insert(key, (password, customer));
        }
        Ok(())
    }

    async fn list_dishes(&self) -> Result<Vec<Dish>, RemoteError> {
        self.respond_after_latency().await;
        let state = self.enter("list_dishes")?;
        Ok(state.dishes.clone())
    }

    async fn list_tables(&self) -> Result<Vec<Table>, RemoteError> {
        self.respond_after_latency().await;
        let state = self.enter("list_tables")?;
        Ok(state.tables.values().cloned().collect())
    }

    async fn tables_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Table>, RemoteError> {
        self.respond_after_latency().await;
        let state = self.enter("tables_for_customer")?;
        Ok(state
            .tables
            .values()
            .filter(|table| table.customer_id.as_ref() == Some(customer_id))
            .cloned()
            .collect())
    }

    async fn update_table(
        &self,
        table_no: &TableNo,
        assignment: TableAssignment,
    ) -> Result<(), RemoteError> {
        self.respond_after_latency().await;
        let mut state = self.enter("update_table")?;
        let table = state
            .tables
            .get_mut(table_no)
            .ok_or_else(|| RemoteError::NotFound(format!("Table {table_no}")))?;

        match assignment {
            TableAssignment::Assign(customer_id) => table.customer_id = Some(customer_id),
            TableAssignment::Release => {
                table.customer_id = None;
                table.order_id = None;
            }
        }
        Ok(())
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, RemoteError> {
        self.respond_after_latency().await;
        let mut state = self.enter("create_order")?;

        state.next_order += 1;
        let id = OrderRef::new(format!("ORD-{:04}", state.next_order));
        let created = Order {
            id: id.clone(),
            customer_id: order.customer_id,
            table_no: order.table_no,
            amount: order.amount,
            date: Some(order.date),
            time: Some(order.time),
            dishes: order.dishes,
            status: order.status,
        };

        if let Some(table) = state.tables.get_mut(&created.table_no) {
            table.order_id = Some(id.clone());
        }
        state.orders.insert(id, created.clone());
        Ok(created)
    }

    async fn update_order(
        &self,
        order_ref: &OrderRef,
        update: OrderUpdate,
    ) -> Result<(), RemoteError> {
        self.respond_after_latency().await;
        let mut state = self.enter("update_order")?;
        let order = state
            .orders
            .get_mut(order_ref)
            .ok_or_else(|| RemoteError::NotFound(format!("Order {order_ref}")))?;

        apply_update(order, update);
        Ok(())
    }

    async fn fetch_order(&self, order_ref: &OrderRef) -> Result<Order, RemoteError> {
        self.respond_after_latency().await;
        let mut state = self.enter("fetch_order")?;

        let scripted = state
            .scripted_statuses
            .get_mut(order_ref)
            .and_then(VecDeque::pop_front);

        let order = state
            .orders
            .get_mut(order_ref)
            .ok_or_else(|| RemoteError::NotFound(format!("Order {order_ref}")))?;

        match scripted {
            Some(Ok(status)) => order.status = status,
            Some(Err(e)) => return Err(e),
            None => {}
        }
        Ok(order.clone())
    }

    async fn orders_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Order>, RemoteError> {
        self.respond_after_latency().await;
        let state = self.enter("orders_for_customer")?;
        Ok(state
            .orders
            .values()
            .filter(|order| &order.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RemoteError> {
        self.respond_after_latency().await;
        let state = self.enter("list_orders")?;
        Ok(state.orders.values().cloned().collect())
    }

    async fn submit_feedback(&self, feedback: NewFeedback) -> Result<Feedback, RemoteError> {
        self.respond_after_latency().await;
        let mut state = self.enter("submit_feedback")?;

        state.next_feedback += 1;
        let stored = Feedback {
            id: Some(format!("FB-{:04}", state.next_feedback)),
            order_id: feedback.order_id,
            customer_id: feedback.customer_id,
            text: feedback.text,
        };
        state.feedback.push(stored.clone());
        Ok(stored)
    }

    async fn feedback_for_order(
        &self,
        order_ref: &OrderRef,
    ) -> Result<Vec<Feedback>, RemoteError> {
        self.respond_after_latency().await;
        let state = self.enter("feedback_for_order")?;
        Ok(state
            .feedback
            .iter()
            .filter(|feedback| &feedback.order_id == order_ref)
            .cloned()
            .collect())
    }
}
