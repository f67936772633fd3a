//! `PostgreSQL` repository for task categories.

use super::{models::CategoryRow, schema::categories};
use crate::database::{PgPool, with_connection};
use crate::task::{
    domain::{Category, CategoryId, CompletionUpdateRule},
    ports::{CategoryRepository, CategoryRepositoryError, CategoryRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed category repository.
#[derive(Debug, Clone)]
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> CategoryRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> CategoryRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        with_connection(&self.pool, CategoryRepositoryError::persistence, f).await
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn store(&self, category: &Category) -> CategoryRepositoryResult<()> {
        let category_id = category.id();
        let row = CategoryRow {
            id: category_id.into_inner(),
            name: category.name().to_owned(),
            parent_id: category.parent().map(CategoryId::into_inner),
            completion_updates: serde_json::to_value(category.completion_updates())
                .map_err(CategoryRepositoryError::persistence)?,
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(categories::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        CategoryRepositoryError::DuplicateCategory(category_id)
                    }
                    other => CategoryRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: CategoryId) -> CategoryRepositoryResult<Option<Category>> {
        self.run_blocking(move |connection| {
            let row = categories::table
                .find(id.into_inner())
                .select(CategoryRow::as_select())
                .first::<CategoryRow>(connection)
                .optional()
                .map_err(CategoryRepositoryError::persistence)?;
            row.map(row_to_category).transpose()
        })
        .await
    }
}

fn row_to_category(row: CategoryRow) -> CategoryRepositoryResult<Category> {
    let rules: Vec<CompletionUpdateRule> = serde_json::from_value(row.completion_updates)
        .map_err(CategoryRepositoryError::persistence)?;
    Ok(Category::from_persisted(
        CategoryId::from_uuid(row.id),
        row.name,
        row.parent_id.map(CategoryId::from_uuid),
        rules,
    ))
}
