//! REST implementation of the restaurant backend.

use std::time::Duration;

use async_trait::async_trait;
use common::{CustomerId, OrderRef, TableNo};
use domain::{
    Customer, CustomerUpdate, Dish, Feedback, NewCustomer, NewFeedback, NewOrder, Order,
    OrderUpdate, Table, TableAssignment,
};
use ordering::{RemoteError, RestaurantBackend};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::wire::{
    WireCreatedOrder, WireCustomer, WireCustomerUpdate, WireDish, WireErrorBody, WireFeedback,
    WireLoginRequest, WireNewCustomer, WireNewFeedback, WireNewOrder, WireOrder, WireOrderUpdate,
    WireTable, WireTableUpdate,
};

/// HTTP client for the restaurant REST backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> ClientResult<Self> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw)
            .map_err(|e| ClientError::InvalidInput(format!("Invalid backend URL {raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidInput(format!(
                "Invalid backend URL {base_url}"
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::new(&config.api_url, config.http_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, RemoteError> {
        let response = self.send(self.client.get(self.url(segments))).await?;
        Self::decode(response).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, RemoteError> {
        let response = self
            .send(self.client.post(self.url(segments)).json(body))
            .await?;
        Self::decode(response).await
    }

    /// Sends a POST and ignores the response body.
    async fn post_unit<B: serde::Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<(), RemoteError> {
        self.send(self.client.post(self.url(segments)).json(body))
            .await?;
        Ok(())
    }

    /// Sends a PUT and ignores the response body.
    async fn put<B: serde::Serialize>(&self, segments: &[&str], body: &B) -> Result<(), RemoteError> {
        self.send(self.client.put(self.url(segments)).json(body))
            .await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<WireErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback_message(status, text));

        tracing::debug!(status = status.as_u16(), %message, "backend rejected request");
        Err(match status {
            StatusCode::NOT_FOUND => RemoteError::NotFound(message),
            _ => RemoteError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }

    /// Like [`get`](Self::get), but a 404 means "none".
    async fn get_list<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>, RemoteError> {
        match self.get(segments).await {
            Err(RemoteError::NotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Transport("request timed out".to_string())
    } else {
        RemoteError::Transport(err.to_string())
    }
}

fn fallback_message(status: StatusCode, body: String) -> String {
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Something went wrong")
            .to_string()
    } else {
        body
    }
}

#[async_trait]
impl RestaurantBackend for HttpBackend {
    #[tracing::instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<Customer, RemoteError> {
        let request = WireLoginRequest { email, password };
        let customer: WireCustomer = self.post(&["Customer", "login"], &request).await?;
        Ok(customer.into())
    }

    #[tracing::instrument(skip(self, customer), fields(email = %customer.email))]
    async fn register(&self, customer: NewCustomer) -> Result<(), RemoteError> {
        self.post_unit(&["Customer"], &WireNewCustomer::from(&customer))
            .await
    }

    async fn fetch_customer(&self, customer_id: &CustomerId) -> Result<Customer, RemoteError> {
        let customer: WireCustomer = self.get(&["Customer", customer_id.as_str()]).await?;
        Ok(customer.into())
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_customer(
        &self,
        customer_id: &CustomerId,
        update: CustomerUpdate,
    ) -> Result<(), RemoteError> {
        self.put(
            &["Customer", customer_id.as_str()],
            &WireCustomerUpdate::from(&update),
        )
        .await
    }

    async fn list_dishes(&self) -> Result<Vec<Dish>, RemoteError> {
        let dishes: Vec<WireDish> = self.get(&["Dish"]).await?;
        Ok(dishes.into_iter().map(Dish::from).collect())
    }

    async fn list_tables(&self) -> Result<Vec<Table>, RemoteError> {
        let tables: Vec<WireTable> = self.get(&["Table"]).await?;
        Ok(tables.into_iter().map(Table::from).collect())
    }

    async fn tables_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Table>, RemoteError> {
        let tables: Vec<WireTable> = self
            .get_list(&["Table", "customer", customer_id.as_str()])
            .await?;
        Ok(tables.into_iter().map(Table::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn update_table(
        &self,
        table_no: &TableNo,
        assignment: TableAssignment,
    ) -> Result<(), RemoteError> {
        self.put(
            &["Table", table_no.as_str()],
            &WireTableUpdate::from(&assignment),
        )
        .await
    }

    #[tracing::instrument(skip(self, order), fields(table_no = %order.table_no))]
    async fn create_order(&self, order: NewOrder) -> Result<Order, RemoteError> {
        let created: WireCreatedOrder = self.post(&["Order"], &WireNewOrder::from(&order)).await?;

        Ok(Order {
            id: OrderRef::new(created.id),
            customer_id: order.customer_id,
            table_no: order.table_no,
            amount: order.amount,
            date: Some(order.date),
            time: Some(order.time),
            dishes: order.dishes,
            status: order.status,
        })
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_order(
        &self,
        order_ref: &OrderRef,
        update: OrderUpdate,
    ) -> Result<(), RemoteError> {
        self.put(
            &["Order", order_ref.as_str()],
            &WireOrderUpdate::from(&update),
        )
        .await
    }

    async fn fetch_order(&self, order_ref: &OrderRef) -> Result<Order, RemoteError> {
        let order: WireOrder = self.get(&["Order", order_ref.as_str()]).await?;
        Ok(order.into())
    }

    async fn orders_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Order>, RemoteError> {
        let orders: Vec<WireOrder> = self
            .get(&["Order", "customer", customer_id.as_str()])
            .await?;
        Ok(orders.into_iter().map(Order::from).collect())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RemoteError> {
        let orders: Vec<WireOrder> = self.get(&["Order"]).await?;
        Ok(orders.into_iter().map(Order::from).collect())
    }

    async fn submit_feedback(&self, feedback: NewFeedback) -> Result<Feedback, RemoteError> {
        let body = WireNewFeedback::from(&feedback);
        let response: serde_json::Value = self.post(&["feedback"], &body).await?;

        // Some deployments answer with the stored record, others with a bare acknowledgement.
        Ok(serde_json::from_value::<WireFeedback>(response)
            .map(Feedback::from)
            .unwrap_or(Feedback {
                id: None,
                order_id: feedback.order_id,
                customer_id: feedback.customer_id,
                text: feedback.text,
            }))
    }

    async fn feedback_for_order(
        &self,
        order_ref: &OrderRef,
    ) -> Result<Vec<Feedback>, RemoteError> {
        let feedback: Vec<WireFeedback> = self
            .get_list(&["feedback", "order", order_ref.as_str()])
            .await?;
        Ok(feedback.into_iter().map(Feedback::from).collect())
    }
}
