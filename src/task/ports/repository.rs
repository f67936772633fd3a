//! Repository port for task persistence and lookup.

use crate::task::domain::{DefectKey, InspectionId, Task, TaskId, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists or [`TaskRepositoryError::DuplicateDefectOrigin`] when the
    /// inspection defect already maps to a task.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task (status, history, legacy
    /// columns, checklist answers, timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Finds the task generated from a given inspection defect.
    ///
    /// Returns `None` when the defect has not been synced.
    async fn find_by_defect(
        &self,
        inspection_id: InspectionId,
        defect_key: &DefectKey,
    ) -> TaskRepositoryResult<Option<Task>>;

    /// Returns all tasks generated from an inspection.
    async fn find_by_inspection(
        &self,
        inspection_id: InspectionId,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns all tasks in `status`, oldest first.
    async fn list_by_status(&self, status: TaskStatus) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A task for the inspection defect already exists.
    #[error("inspection {inspection_id} defect '{defect_key}' already has a task")]
    DuplicateDefectOrigin {
        /// Inspection identifier.
        inspection_id: InspectionId,
        /// Defect key.
        defect_key: DefectKey,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
