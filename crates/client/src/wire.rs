//! Backend wire format.
//!
//! The backend names fields with spaces and mixed casing, sends identifiers
//! as either strings or numbers, and encodes status flags inconsistently.
//! Everything is normalized here; the rest of the client only sees the
//! domain types.

use chrono::{NaiveDate, NaiveTime};
use common::{CustomerId, DishId, OrderRef, TableNo};
use domain::{
    Customer, CustomerUpdate, Dish, Feedback, LineItem, Money, NewCustomer, NewFeedback, NewOrder,
    Order, OrderStatus, OrderUpdate, Table, TableAssignment,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ============================================================================
// Field decoders
// ============================================================================

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts a string or a number.
fn flexible_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value.clone())
        .ok_or_else(|| serde::de::Error::custom(format!("expected string or number, got {value}")))
}

/// Accepts a string, a number, or null. Empty strings and zero count as absent.
fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(scalar_to_string)
        .filter(|s| !s.trim().is_empty() && s != "0"))
}

/// Accepts booleans, 0/1 numbers and strings such as `"true"` or `"1"`.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        ),
        Some(_) => false,
    })
}

/// Accepts an amount in major units as a number or numeric string.
fn money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let major = match value {
        None | Some(Value::Null) => return Ok(Money::zero()),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    major
        .map(major_to_money)
        .ok_or_else(|| serde::de::Error::custom("expected a numeric amount"))
}

fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|q| u32::try_from(q).ok())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid quantity {value}")))
}

fn major_to_money(major: f64) -> Money {
    Money::from_minor((major * 100.0).round() as i64)
}

/// Writes whole amounts as integers and the rest as decimals.
fn serialize_money<S: Serializer>(amount: &Money, serializer: S) -> Result<S::Ok, S::Error> {
    if amount.minor() % 100 == 0 {
        serializer.serialize_i64(amount.major())
    } else {
        serializer.serialize_f64(amount.minor() as f64 / 100.0)
    }
}

/// Parses `YYYY-MM-DD`, also when followed by a time part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

// ============================================================================
// Responses
// ============================================================================

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
pub struct WireErrorBody {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireDish {
    #[serde(rename = "DishId", alias = "Dish Id", deserialize_with = "flexible_string")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Price", default, deserialize_with = "money")]
    pub price: Money,
    #[serde(rename = "Type of Dish", default)]
    pub category: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

impl From<WireDish> for Dish {
    fn from(wire: WireDish) -> Self {
        Dish {
            id: DishId::new(wire.id),
            name: wire.name,
            price: wire.price,
            category: wire.category,
            description: wire.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireLine {
    #[serde(rename = "DishId", alias = "Dish Id", deserialize_with = "flexible_string")]
    pub dish_id: String,
    #[serde(rename = "Quantity", deserialize_with = "quantity")]
    pub quantity: u32,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Price", default, deserialize_with = "money")]
    pub price: Money,
}

impl From<WireLine> for LineItem {
    fn from(wire: WireLine) -> Self {
        LineItem::new(wire.dish_id, wire.name, wire.quantity, wire.price)
    }
}

#[derive(Debug, Deserialize)]
pub struct WireOrder {
    #[serde(rename = "Order Id", deserialize_with = "flexible_string")]
    pub id: String,
    #[serde(rename = "Customer Id", default, deserialize_with = "optional_id")]
    pub customer_id: Option<String>,
    #[serde(rename = "Table No", default, deserialize_with = "optional_id")]
    pub table_no: Option<String>,
    #[serde(rename = "Amount", default, deserialize_with = "money")]
    pub amount: Money,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
    #[serde(rename = "Dishes", default)]
    pub dishes: Vec<WireLine>,
    #[serde(rename = "Serving Status", default, deserialize_with = "flag")]
    pub serving_status: bool,
    #[serde(rename = "Payment Status", default, deserialize_with = "flag")]
    pub payment_status: bool,
}

impl From<WireOrder> for Order {
    fn from(wire: WireOrder) -> Self {
        Order {
            id: OrderRef::new(wire.id),
            customer_id: CustomerId::new(wire.customer_id.unwrap_or_default()),
            table_no: TableNo::new(wire.table_no.unwrap_or_default()),
            amount: wire.amount,
            date: wire.date.as_deref().and_then(parse_date),
            time: wire.time.as_deref().and_then(parse_time),
            dishes: wire.dishes.into_iter().map(LineItem::from).collect(),
            status: OrderStatus::new(wire.serving_status, wire.payment_status),
        }
    }
}

/// The part of a create response the client relies on.
#[derive(Debug, Deserialize)]
pub struct WireCreatedOrder {
    #[serde(rename = "Order Id", deserialize_with = "flexible_string")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct WireTable {
    #[serde(rename = "Table No", deserialize_with = "flexible_string")]
    pub table_no: String,
    #[serde(rename = "Customer ID", default, deserialize_with = "optional_id")]
    pub customer_id: Option<String>,
    #[serde(rename = "Order Id", default, deserialize_with = "optional_id")]
    pub order_id: Option<String>,
}

impl From<WireTable> for Table {
    fn from(wire: WireTable) -> Self {
        Table {
            table_no: TableNo::new(wire.table_no),
            customer_id: wire.customer_id.map(CustomerId::new),
            order_id: wire.order_id.map(OrderRef::new),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireCustomer {
    #[serde(rename = "Customer Id", deserialize_with = "flexible_string")]
    pub id: String,
    #[serde(rename = "Customer Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Email", alias = "email", default)]
    pub email: Option<String>,
    #[serde(rename = "Contact Number", default, deserialize_with = "optional_id")]
    pub contact_number: Option<String>,
}

impl From<WireCustomer> for Customer {
    fn from(wire: WireCustomer) -> Self {
        Customer {
            id: CustomerId::new(wire.id),
            name: wire.name,
            email: wire.email,
            contact_number: wire.contact_number,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireFeedback {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "optional_id")]
    pub id: Option<String>,
    #[serde(rename = "orderId", deserialize_with = "flexible_string")]
    pub order_id: String,
    #[serde(rename = "customerId", deserialize_with = "flexible_string")]
    pub customer_id: String,
    pub feedback: String,
}

impl From<WireFeedback> for Feedback {
    fn from(wire: WireFeedback) -> Self {
        Feedback {
            id: wire.id,
            order_id: OrderRef::new(wire.order_id),
            customer_id: CustomerId::new(wire.customer_id),
            text: wire.feedback,
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Serialize)]
pub struct WireLoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Sends an all-digit contact number as a number, anything else as text.
fn serialize_contact<S: Serializer>(
    contact: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match contact.as_deref() {
        Some(number) => match number.parse::<u64>() {
            Ok(digits) => serializer.serialize_u64(digits),
            Err(_) => serializer.serialize_str(number),
        },
        None => serializer.serialize_none(),
    }
}

/// Body for `POST /Customer`.
#[derive(Debug, Serialize)]
pub struct WireNewCustomer {
    #[serde(rename = "Customer Name")]
    pub name: String,
    #[serde(
        rename = "Contact Number",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_contact"
    )]
    pub contact_number: Option<String>,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Password")]
    pub password: String,
}

impl From<&NewCustomer> for WireNewCustomer {
    fn from(customer: &NewCustomer) -> Self {
        Self {
            name: customer.name.clone(),
            contact_number: customer.contact_number.clone(),
            email: customer.email.clone(),
            password: customer.password.clone(),
        }
    }
}

/// Body for `PUT /Customer/{id}`.
#[derive(Debug, Serialize)]
pub struct WireCustomerUpdate {
    #[serde(rename = "Customer Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "Contact Number",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_contact"
    )]
    pub contact_number: Option<String>,
    #[serde(rename = "Email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&CustomerUpdate> for WireCustomerUpdate {
    fn from(update: &CustomerUpdate) -> Self {
        Self {
            name: update.name.clone(),
            contact_number: update.contact_number.clone(),
            email: update.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireLineOut {
    #[serde(rename = "DishId")]
    pub dish_id: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Price", serialize_with = "serialize_money")]
    pub price: Money,
}

impl From<&LineItem> for WireLineOut {
    fn from(line: &LineItem) -> Self {
        Self {
            dish_id: line.dish_id.to_string(),
            quantity: line.quantity,
            name: line.name.clone(),
            price: line.unit_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireNewOrder {
    #[serde(rename = "Customer Id")]
    pub customer_id: String,
    #[serde(rename = "Table No")]
    pub table_no: String,
    #[serde(rename = "Amount", serialize_with = "serialize_money")]
    pub amount: Money,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Dishes")]
    pub dishes: Vec<WireLineOut>,
    #[serde(rename = "Payment Status")]
    pub payment_status: bool,
    #[serde(rename = "Serving Status")]
    pub serving_status: bool,
}

impl From<&NewOrder> for WireNewOrder {
    fn from(order: &NewOrder) -> Self {
        Self {
            customer_id: order.customer_id.to_string(),
            table_no: order.table_no.to_string(),
            amount: order.amount,
            time: order.time.format("%H:%M").to_string(),
            date: order.date.format("%Y-%m-%d").to_string(),
            dishes: order.dishes.iter().map(WireLineOut::from).collect(),
            payment_status: order.status.is_paid,
            serving_status: order.status.is_served,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireOrderUpdate {
    #[serde(rename = "Dishes", skip_serializing_if = "Option::is_none")]
    pub dishes: Option<Vec<WireLineOut>>,
    #[serde(
        rename = "Amount",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_money"
    )]
    pub amount: Option<Money>,
    #[serde(rename = "Serving Status", skip_serializing_if = "Option::is_none")]
    pub serving_status: Option<bool>,
    #[serde(rename = "Payment Status", skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<bool>,
}

fn serialize_optional_money<S: Serializer>(
    amount: &Option<Money>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match amount {
        Some(amount) => serialize_money(amount, serializer),
        None => serializer.serialize_none(),
    }
}

impl From<&OrderUpdate> for WireOrderUpdate {
    fn from(update: &OrderUpdate) -> Self {
        Self {
            dishes: update
                .dishes
                .as_ref()
                .map(|lines| lines.iter().map(WireLineOut::from).collect()),
            amount: update.amount,
            serving_status: update.is_served,
            payment_status: update.is_paid,
        }
    }
}

/// Body for `PUT /Table/{no}`.
#[derive(Debug, Serialize)]
pub struct WireTableUpdate {
    #[serde(rename = "Customer ID")]
    pub customer_id: Option<String>,
    /// Only sent when releasing, to clear the association.
    #[serde(rename = "Order Id", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Option<String>>,
}

impl From<&TableAssignment> for WireTableUpdate {
    fn from(assignment: &TableAssignment) -> Self {
        match assignment {
            TableAssignment::Assign(customer_id) => Self {
                customer_id: Some(customer_id.to_string()),
                order_id: None,
            },
            TableAssignment::Release => Self {
                customer_id: None,
                order_id: Some(None),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireNewFeedback {
    pub feedback: String,
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(rename = "customerId")]
    pub customer_id: String,
}

impl From<&NewFeedback> for WireNewFeedback {
    fn from(feedback: &NewFeedback) -> Self {
        Self {
            feedback: feedback.text.clone(),
            order_id: feedback.order_id.to_string(),
            customer_id: feedback.customer_id.to_string(),
        }
    }
}
