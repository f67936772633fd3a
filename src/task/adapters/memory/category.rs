//! In-memory repository for task categories.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Category, CategoryId},
    ports::{CategoryRepository, CategoryRepositoryError, CategoryRepositoryResult},
};

/// Thread-safe in-memory category repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<HashMap<CategoryId, Category>>>,
}

impl InMemoryCategoryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> CategoryRepositoryError {
    CategoryRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn store(&self, category: &Category) -> CategoryRepositoryResult<()> {
        let mut categories = self.categories.write().map_err(lock_error)?;
        if categories.contains_key(&category.id()) {
            return Err(CategoryRepositoryError::DuplicateCategory(category.id()));
        }
        categories.insert(category.id(), category.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CategoryId) -> CategoryRepositoryResult<Option<Category>> {
        let categories = self.categories.read().map_err(lock_error)?;
        Ok(categories.get(&id).cloned())
    }
}
