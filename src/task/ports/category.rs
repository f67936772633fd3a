//! Repository port for task categories.

use crate::task::domain::{Category, CategoryId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for category repository operations.
pub type CategoryRepositoryResult<T> = Result<T, CategoryRepositoryError>;

/// Category persistence contract.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Stores a new category.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryRepositoryError::DuplicateCategory`] when the ID
    /// already exists.
    async fn store(&self, category: &Category) -> CategoryRepositoryResult<()>;

    /// Finds a category by identifier.
    async fn find_by_id(&self, id: CategoryId) -> CategoryRepositoryResult<Option<Category>>;
}

/// Errors returned by category repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CategoryRepositoryError {
    /// A category with the same identifier already exists.
    #[error("duplicate category identifier: {0}")]
    DuplicateCategory(CategoryId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CategoryRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
