//! The REST backend as seen by the ordering core.
//!
//! [`RestaurantBackend`] speaks the canonical domain types; translating to
//! and from the backend's wire format is the implementor's job.

pub mod memory;

pub use memory::InMemoryBackend;

use async_trait::async_trait;
use common::{CustomerId, OrderRef, TableNo};
use domain::{
    Customer, CustomerUpdate, Dish, Feedback, NewCustomer, NewFeedback, NewOrder, Order,
    OrderUpdate, Table, TableAssignment,
};

use crate::error::RemoteError;

/// Trait for the remote restaurant backend.
#[async_trait]
pub trait RestaurantBackend: Send + Sync {
    /// Authenticates a customer (`POST /Customer/login`).
    async fn login(&self, email: &str, password: &str) -> Result<Customer, RemoteError>;

    /// Creates a customer account (`POST /Customer`).
    async fn register(&self, customer: NewCustomer) -> Result<(), RemoteError>;

    /// Fetches a customer's profile (`GET /Customer/{id}`).
    async fn fetch_customer(&self, customer_id: &CustomerId) -> Result<Customer, RemoteError>;

    /// Changes a customer's profile (`PUT /Customer/{id}`).
    async fn update_customer(
        &self,
        customer_id: &CustomerId,
        update: CustomerUpdate,
    ) -> Result<(), RemoteError>;

    /// Lists the menu (`GET /Dish`).
    async fn list_dishes(&self) -> Result<Vec<Dish>, RemoteError>;

    /// Lists all tables (`GET /Table`).
    async fn list_tables(&self) -> Result<Vec<Table>, RemoteError>;

    /// Lists the tables a customer is seated at (`GET /Table/customer/{id}`).
    async fn tables_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Table>, RemoteError>;

    /// Assigns or clears a table's association (`PUT /Table/{no}`).
    async fn update_table(
        &self,
        table_no: &TableNo,
        assignment: TableAssignment,
    ) -> Result<(), RemoteError>;

    /// Creates an order (`POST /Order`) and returns it with its assigned id.
    async fn create_order(&self, order: NewOrder) -> Result<Order, RemoteError>;

    /// Applies a partial update to an order (`PUT /Order/{id}`).
    ///
    /// Added dishes are merged into the order by the backend.
    async fn update_order(
        &self,
        order_ref: &OrderRef,
        update: OrderUpdate,
    ) -> Result<(), RemoteError>;

    /// Fetches the full order record (`GET /Order/{id}`).
    async fn fetch_order(&self, order_ref: &OrderRef) -> Result<Order, RemoteError>;

    /// Lists a customer's orders (`GET /Order/customer/{id}`).
    async fn orders_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Order>, RemoteError>;

    /// Lists every order (`GET /Order`).
    async fn list_orders(&self) -> Result<Vec<Order>, RemoteError>;

    /// Submits feedback (`POST /feedback`).
    async fn submit_feedback(&self, feedback: NewFeedback) -> Result<Feedback, RemoteError>;

    /// Lists feedback left on an order (`GET /feedback/order/{id}`).
    async fn feedback_for_order(&self, order_ref: &OrderRef)
    -> Result<Vec<Feedback>, RemoteError>;
}
