//! In-memory repository for task comments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{CommentId, TaskComment, TaskId},
    ports::{CommentRepository, CommentRepositoryError, CommentRepositoryResult},
};

/// Thread-safe in-memory comment repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommentRepository {
    comments: Arc<RwLock<HashMap<CommentId, TaskComment>>>,
}

impl InMemoryCommentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> CommentRepositoryError {
    CommentRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn store(&self, comment: &TaskComment) -> CommentRepositoryResult<()> {
        let mut comments = self.comments.write().map_err(lock_error)?;
        if comments.contains_key(&comment.id()) {
            return Err(CommentRepositoryError::DuplicateComment(comment.id()));
        }
        comments.insert(comment.id(), comment.clone());
        Ok(())
    }

    async fn update(&self, comment: &TaskComment) -> CommentRepositoryResult<()> {
        let mut comments = self.comments.write().map_err(lock_error)?;
        let stored = comments
            .get_mut(&comment.id())
            .ok_or(CommentRepositoryError::NotFound(comment.id()))?;
        *stored = comment.clone();
        Ok(())
    }

    async fn delete(&self, id: CommentId) -> CommentRepositoryResult<()> {
        let mut comments = self.comments.write().map_err(lock_error)?;
        comments
            .remove(&id)
            .map(|_| ())
            .ok_or(CommentRepositoryError::NotFound(id))
    }

    async fn find_by_id(&self, id: CommentId) -> CommentRepositoryResult<Option<TaskComment>> {
        let comments = self.comments.read().map_err(lock_error)?;
        Ok(comments.get(&id).cloned())
    }

    async fn list_for_task(&self, task_id: TaskId) -> CommentRepositoryResult<Vec<TaskComment>> {
        let comments = self.comments.read().map_err(lock_error)?;
        let mut found: Vec<TaskComment> = comments
            .values()
            .filter(|comment| comment.task_id() == task_id)
            .cloned()
            .collect();
        found.sort_by_key(|comment| (comment.created_at(), comment.id()));
        Ok(found)
    }
}
