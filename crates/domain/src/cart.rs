//! Cart value type.

use common::DishId;
use serde::{Deserialize, Serialize};

use crate::{Dish, LineItem, Money};

/// A dish selected into the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The selected dish.
    pub dish: Dish,

    /// Quantity selected; never zero in a normalized cart.
    pub quantity: u32,
}

impl CartItem {
    /// Creates a new cart item.
    pub fn new(dish: Dish, quantity: u32) -> Self {
        Self { dish, quantity }
    }

    /// Returns the total price for this item (quantity * unit price).
    pub fn total_price(&self) -> Money {
        self.dish.price.multiply(self.quantity)
    }
}

/// The set of dishes a customer has selected but not yet ordered.
///
/// Holds at most one entry per dish id. Entries keep the order in which dishes
/// were first added; that order does not affect the total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of `dish`, merging into an existing entry for the same dish.
    ///
    /// A zero quantity leaves the cart unchanged.
    pub fn add_item(&mut self, dish: Dish, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.items.iter_mut().find(|item| item.dish.id == dish.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => self.items.push(CartItem::new(dish, quantity)),
        }
    }

    /// Removes the entry for `dish_id`. Returns true if an entry was removed.
    pub fn remove_item(&mut self, dish_id: &DishId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.dish.id != dish_id);
        self.items.len() != before
    }

    /// Sets the quantity for `dish_id`.
    ///
    /// A non-positive quantity removes the entry. Dishes not in the cart are
    /// left alone.
    pub fn update_quantity(&mut self, dish_id: &DishId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(dish_id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|item| &item.dish.id == dish_id) {
            item.quantity = quantity;
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns Σ(price × quantity); zero for an empty cart.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::total_price).sum()
    }

    /// Returns all entries.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the entry for `dish_id`.
    pub fn get(&self, dish_id: &DishId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.dish.id == dish_id)
    }

    /// Returns the number of distinct dishes.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns the summed quantity across all entries.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Converts the entries into order line items.
    pub fn to_line_items(&self) -> Vec<LineItem> {
        self.items.iter().map(LineItem::from).collect()
    }

    /// Takes `ordered` out of this cart.
    ///
    /// Each dish's quantity drops by the ordered quantity; dishes that reach
    /// zero are removed and dishes not in `ordered` are kept.
    pub fn subtract(&mut self, ordered: &Cart) {
        for line in &ordered.items {
            if let Some(item) = self.get(&line.dish.id) {
                let left = i64::from(item.quantity) - i64::from(line.quantity);
                self.update_quantity(&line.dish.id, left);
            }
        }
    }
}

impl From<Vec<CartItem>> for Cart {
    /// Builds a normalized cart: duplicates merged, zero quantities dropped.
    fn from(items: Vec<CartItem>) -> Self {
        let mut cart = Cart::new();
        for item in items {
            cart.add_item(item.dish, item.quantity);
        }
        cart
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dish(id: &str, price: i64) -> Dish {
        Dish::new(id, format!("Dish {id}"), Money::from_major(price))
    }

    #[test]
    fn test_add_new_dish_appends() {
        let mut cart = Cart::new();
        cart.add_item(dish("D1", 100), 2);
        cart.add_item(dish("D2", 50), 1);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].dish.id.as_str(), "D1");
        assert_eq!(cart.total(), Money::from_major(250));
    }

    #[test]
    fn test_add_existing_dish_merges() {
        let mut cart = Cart::new();
        cart.add_item(dish("D1", 100), 2);
        cart.add_item(dish("D1", 100), 3);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&DishId::new("D1")).unwrap().quantity, 5);
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(dish("D1", 100), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing_dish_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(dish("D1", 100), 1);

        assert!(!cart.remove_item(&DishId::new("D9")));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_update_quantity_sets_exactly() {
        let mut cart = Cart::new();
        cart.add_item(dish("D1", 100), 1);
        cart.update_quantity(&DishId::new("D1"), 4);

        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total(), Money::from_major(400));
    }

    #[test]
    fn test_update_quantity_zero_equals_remove() {
        let mut updated = Cart::new();
        updated.add_item(dish("D1", 100), 1);
        updated.add_item(dish("D2", 50), 2);
        let mut removed = updated.clone();

        updated.update_quantity(&DishId::new("D1"), 0);
        removed.remove_item(&DishId::new("D1"));

        assert_eq!(updated, removed);
    }

    #[test]
    fn test_update_quantity_negative_removes() {
        let mut cart = Cart::new();
        cart.add_item(dish("D1", 100), 1);
        cart.update_quantity(&DishId::new("D1"), -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_of_missing_dish_does_not_add() {
        let mut cart = Cart::new();
        cart.update_quantity(&DishId::new("D1"), 2);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        assert!(Cart::new().total().is_zero());
    }

    #[test]
    fn test_serialized_as_plain_list() {
        let mut cart = Cart::new();
        cart.add_item(dish("D1", 100), 2);

        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["quantity"], 2);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_deserialize_normalizes_duplicates_and_zeroes() {
        let json = serde_json::json!([
            { "dish": { "id": "D1", "name": "A", "price": 10000 }, "quantity": 1 },
            { "dish": { "id": "D2", "name": "B", "price": 5000 }, "quantity": 0 },
            { "dish": { "id": "D1", "name": "A", "price": 10000 }, "quantity": 2 }
        ]);

        let cart: Cart = serde_json::from_value(json).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_line_items_carry_name_and_price() {
        let mut cart = Cart::new();
        cart.add_item(dish("D1", 100), 2);

        let lines = cart.to_line_items();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].dish_id.as_str(), "D1");
        assert_eq!(lines[0].name, "Dish D1");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].unit_price, Money::from_major(100));
    }

    #[test]
    fn test_subtract_keeps_what_was_not_ordered() {
        let mut ordered = Cart::new();
        ordered.add_item(dish("D1", 100), 2);

        let mut cart = ordered.clone();
        cart.add_item(dish("D1", 100), 1);
        cart.add_item(dish("D2", 50), 1);
        cart.subtract(&ordered);

        assert_eq!(cart.get(&DishId::new("D1")).map(|i| i.quantity), Some(1));
        assert_eq!(cart.get(&DishId::new("D2")).map(|i| i.quantity), Some(1));

        cart.subtract(&cart.clone());
        assert!(cart.is_empty());
    }
}
