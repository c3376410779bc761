//! Menu and table lookups.

use std::sync::Arc;

use common::DishId;
use domain::{Dish, Table};

use crate::backend::RestaurantBackend;
use crate::error::Result;

/// Read-only view of the menu and the dining room.
pub struct Catalog<B: RestaurantBackend> {
    backend: Arc<B>,
}

impl<B: RestaurantBackend> Catalog<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Returns every dish on the menu.
    pub async fn dishes(&self) -> Result<Vec<Dish>> {
        Ok(self.backend.list_dishes().await?)
    }

    /// Returns the dishes whose category contains `category`.
    pub async fn dishes_in_category(&self, category: &str) -> Result<Vec<Dish>> {
        let dishes = self.backend.list_dishes().await?;
        Ok(dishes
            .into_iter()
            .filter(|dish| dish.in_category(category))
            .collect())
    }

    pub async fn find_dish(&self, dish_id: &DishId) -> Result<Option<Dish>> {
        let dishes = self.backend.list_dishes().await?;
        Ok(dishes.into_iter().find(|dish| &dish.id == dish_id))
    }

    /// Returns the tables nobody is seated at.
    pub async fn available_tables(&self) -> Result<Vec<Table>> {
        let tables = self.backend.list_tables().await?;
        Ok(tables.into_iter().filter(Table::is_available).collect())
    }
}
