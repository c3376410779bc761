//! Menu dishes.

use common::DishId;
use serde::{Deserialize, Serialize};

use crate::Money;

/// A menu item as sourced from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    /// Catalog identifier.
    pub id: DishId,

    /// Display name.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// Free-form category label (e.g. "Starter, Veg").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Dish {
    /// Creates a dish with no category or description.
    pub fn new(id: impl Into<DishId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category: None,
            description: None,
        }
    }

    /// Sets the category label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns true if the category label mentions `category`.
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|label| label.contains(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_match_is_substring() {
        let dish = Dish::new("D1", "Paneer Tikka", Money::from_major(180)).with_category("Starter, Veg");
        assert!(dish.in_category("Starter"));
        assert!(dish.in_category("Veg"));
        assert!(!dish.in_category("Dessert"));
    }

    #[test]
    fn uncategorised_dish_matches_nothing() {
        let dish = Dish::new("D2", "Water", Money::from_major(20));
        assert!(!dish.in_category(""));
    }
}
