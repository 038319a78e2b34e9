use std::sync::Arc;
use tracing::{info, warn};

use crate::storage::{CollectionStore, KeyValueStorage, WriteMode, CATEGORIES_KEY};
use shared::{default_categories, Category, CategoryListResponse};

/// Service exposing the category catalog.
///
/// The catalog is seeded with the default categories and never modified;
/// the seed only lives in memory until something writes the store.
#[derive(Clone)]
pub struct CategoryService {
    store: CollectionStore<Vec<Category>>,
}

impl CategoryService {
    pub fn new(provider: Arc<dyn KeyValueStorage>, write_mode: WriteMode) -> Self {
        let store = CollectionStore::new(CATEGORIES_KEY, default_categories(), provider)
            .with_write_mode(write_mode);
        Self { store }
    }

    /// Load the catalog from the preference store
    pub async fn load(&self) -> Vec<Category> {
        let categories = self.store.load().await;
        info!("Category catalog ready with {} categories", categories.len());
        categories
    }

    pub fn list_categories(&self) -> CategoryListResponse {
        CategoryListResponse {
            categories: self.store.get(),
        }
    }

    /// Look up a category by ID
    pub fn find_category(&self, category_id: &str) -> Option<Category> {
        let category = self
            .store
            .with_value(|categories| categories.iter().find(|c| c.id == category_id).cloned());

        if category.is_none() {
            warn!("Category not found: {}", category_id);
        }
        category
    }
}
