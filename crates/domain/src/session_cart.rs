//! Cart aggregate persisted through the session store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use common::DishId;
use session_store::{SessionStore, SessionStoreExt};

use crate::{Cart, Dish, Money, SessionKey};

/// The session's cart, kept in memory and written through to the store.
///
/// Every mutation updates the in-memory cart and persists it while holding the
/// same lock, so no caller can observe a mutated cart that has not been saved.
pub struct SessionCart<S: SessionStore> {
    store: S,
    cart: Mutex<Cart>,
}

impl<S: SessionStore> SessionCart<S> {
    /// Restores the cart from `store`, starting empty if nothing usable is stored.
    pub fn load(store: S) -> Self {
        let cart = store
            .load_as::<Cart>(SessionKey::Cart.as_str())
            .unwrap_or_default();

        tracing::debug!(dishes = cart.len(), "cart restored");

        Self {
            store,
            cart: Mutex::new(cart),
        }
    }

    /// Adds `quantity` of `dish`, merging with an existing entry.
    pub fn add_item(&self, dish: Dish, quantity: u32) {
        self.mutate(|cart| cart.add_item(dish, quantity));
    }

    /// Removes the entry for `dish_id`, if any.
    pub fn remove_item(&self, dish_id: &DishId) {
        self.mutate(|cart| {
            cart.remove_item(dish_id);
        });
    }

    /// Sets the quantity for `dish_id`; non-positive quantities remove it.
    pub fn update_quantity(&self, dish_id: &DishId, quantity: i64) {
        self.mutate(|cart| cart.update_quantity(dish_id, quantity));
    }

    /// Empties the cart and removes the persisted entry.
    pub fn clear(&self) {
        let mut cart = self.lock();
        cart.clear();
        self.store.clear(SessionKey::Cart.as_str());
    }

    /// Removes the dishes in `ordered`, keeping anything added since that
    /// snapshot was taken.
    pub fn remove_ordered(&self, ordered: &Cart) {
        let mut cart = self.lock();
        cart.subtract(ordered);
        if cart.is_empty() {
            self.store.clear(SessionKey::Cart.as_str());
        } else {
            self.store
                .save_as(SessionKey::Cart.as_str(), &*cart, SessionKey::Cart.ttl());
        }
    }

    /// Returns the cart total.
    pub fn total(&self) -> Money {
        self.lock().total()
    }

    /// Returns a copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn mutate(&self, f: impl FnOnce(&mut Cart)) {
        let mut cart = self.lock();
        f(&mut cart);
        self.store
            .save_as(SessionKey::Cart.as_str(), &*cart, SessionKey::Cart.ttl());
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: SessionStore> std::fmt::Debug for SessionCart<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCart")
            .field("cart", &*self.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_store::InMemorySessionStore;

    fn dish(id: &str, price: i64) -> Dish {
        Dish::new(id, format!("Dish {id}"), Money::from_major(price))
    }

    fn persisted(store: &InMemorySessionStore) -> Option<Cart> {
        store.load_as::<Cart>(SessionKey::Cart.as_str())
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let store = InMemorySessionStore::new();
        let cart = SessionCart::load(store.clone());

        cart.add_item(dish("D1", 100), 2);
        assert_eq!(persisted(&store), Some(cart.snapshot()));

        cart.update_quantity(&DishId::new("D1"), 5);
        assert_eq!(persisted(&store).unwrap().item_count(), 5);

        cart.remove_item(&DishId::new("D1"));
        assert_eq!(persisted(&store), Some(Cart::new()));
    }

    #[test]
    fn test_clear_removes_persisted_entry() {
        let store = InMemorySessionStore::new();
        let cart = SessionCart::load(store.clone());
        cart.add_item(dish("D1", 100), 1);

        cart.clear();

        assert!(cart.is_empty());
        assert!(store.load(SessionKey::Cart.as_str()).is_none());
    }

    #[test]
    fn test_load_restores_previous_session() {
        let store = InMemorySessionStore::new();
        {
            let cart = SessionCart::load(store.clone());
            cart.add_item(dish("D1", 100), 2);
            cart.add_item(dish("D2", 50), 1);
        }

        let restored = SessionCart::load(store);
        assert_eq!(restored.total(), Money::from_major(250));
        assert_eq!(restored.snapshot().len(), 2);
    }

    #[test]
    fn test_load_ignores_corrupt_entry() {
        let store = InMemorySessionStore::new();
        store.save(
            SessionKey::Cart.as_str(),
            serde_json::json!({"not": "a cart"}),
            SessionKey::Cart.ttl(),
        );

        let cart = SessionCart::load(store);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_ordered_keeps_later_additions() {
        let store = InMemorySessionStore::new();
        let cart = SessionCart::load(store.clone());
        cart.add_item(dish("D1", 100), 2);
        let ordered = cart.snapshot();

        cart.add_item(dish("D2", 50), 1);
        cart.remove_ordered(&ordered);

        assert_eq!(cart.snapshot().len(), 1);
        assert_eq!(persisted(&store), Some(cart.snapshot()));

        cart.remove_ordered(&cart.snapshot());
        assert!(store.load(SessionKey::Cart.as_str()).is_none());
    }
}
