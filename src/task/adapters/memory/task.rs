//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{DefectKey, InspectionId, Task, TaskId, TaskOrigin, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    defect_index: HashMap<(InspectionId, DefectKey), TaskId>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn defect_index_key(task: &Task) -> Option<(InspectionId, DefectKey)> {
    match task.origin() {
        TaskOrigin::InspectionDefect {
            inspection_id,
            defect_key,
        } => Some((*inspection_id, defect_key.clone())),
        TaskOrigin::Manual => None,
    }
}

fn lock_error(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn sorted_oldest_first(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|task| (task.created_at(), task.id()));
    tasks
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }

        if let Some(key) = defect_index_key(task) {
            if state.defect_index.contains_key(&key) {
                let (inspection_id, defect_key) = key;
                return Err(TaskRepositoryError::DuplicateDefectOrigin {
                    inspection_id,
                    defect_key,
                });
            }
            state.defect_index.insert(key, task.id());
        }

        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        // Origin is immutable, so the defect index never needs rewriting.
        *stored = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_defect(
        &self,
        inspection_id: InspectionId,
        defect_key: &DefectKey,
    ) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let task = state
            .defect_index
            .get(&(inspection_id, defect_key.clone()))
            .and_then(|task_id| state.tasks.get(task_id))
            .cloned();
        Ok(task)
    }

    async fn find_by_inspection(
        &self,
        inspection_id: InspectionId,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let tasks = state
            .defect_index
            .iter()
            .filter(|((inspection, _), _)| *inspection == inspection_id)
            .filter_map(|(_, task_id)| state.tasks.get(task_id).cloned())
            .collect();
        Ok(sorted_oldest_first(tasks))
    }

    async fn list_by_status(&self, status: TaskStatus) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let tasks = state
            .tasks
            .values()
            .filter(|task| task.status() == status)
            .cloned()
            .collect();
        Ok(sorted_oldest_first(tasks))
    }
}
