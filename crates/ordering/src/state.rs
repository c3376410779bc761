//! Order-related session values.

use common::OrderRef;
use domain::{OrderStatus, SessionKey};
use session_store::{SessionStore, SessionStoreExt};

pub(crate) fn current_order(store: &impl SessionStore) -> Option<OrderRef> {
    store
        .load_as::<OrderRef>(SessionKey::CurrentOrderId.as_str())
        .filter(|order_ref| !order_ref.is_blank())
}

pub(crate) fn cached_status(store: &impl SessionStore) -> Option<OrderStatus> {
    store.load_as(SessionKey::OrderStatus.as_str())
}

pub(crate) fn record_order(store: &impl SessionStore, order_ref: &OrderRef, status: OrderStatus) {
    store.save_as(
        SessionKey::CurrentOrderId.as_str(),
        order_ref,
        SessionKey::CurrentOrderId.ttl(),
    );
    record_status(store, status);
}

pub(crate) fn record_status(store: &impl SessionStore, status: OrderStatus) {
    store.save_as(
        SessionKey::OrderStatus.as_str(),
        &status,
        SessionKey::OrderStatus.ttl(),
    );
}

/// Forgets the open order. The cart is left alone.
pub(crate) fn forget_order(store: &impl SessionStore) {
    store.clear(SessionKey::CurrentOrderId.as_str());
    store.clear(SessionKey::OrderStatus.as_str());
}
