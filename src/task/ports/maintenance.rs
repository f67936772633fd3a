//! Port for writing derived values into asset maintenance records.

use crate::task::domain::{ActorRef, CompletionValue, FieldName, TaskAsset};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for maintenance writes.
pub type MaintenanceRepositoryResult<T> = Result<T, MaintenanceRepositoryError>;

/// Maintenance record write contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    /// Writes `value` into `field` of the maintenance record for `asset`,
    /// creating the record when the asset has none yet.
    ///
    /// # Errors
    ///
    /// Returns [`MaintenanceRepositoryError::UnknownField`] when the
    /// maintenance table has no such column, or a persistence error.
    async fn write_field(
        &self,
        asset: TaskAsset,
        field: &FieldName,
        value: &CompletionValue,
        updated_by: &ActorRef,
    ) -> MaintenanceRepositoryResult<()>;
}

/// Errors returned by maintenance repository implementations.
#[derive(Debug, Clone, Error)]
pub enum MaintenanceRepositoryError {
    /// The maintenance table has no such column.
    #[error("maintenance record has no field '{0}'")]
    UnknownField(FieldName),

    /// The value type does not match the column type.
    #[error("field '{field}' cannot hold value {value}")]
    TypeMismatch {
        /// Column written.
        field: FieldName,
        /// Rejected value.
        value: CompletionValue,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MaintenanceRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
