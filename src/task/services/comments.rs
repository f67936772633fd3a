//! Service layer for task comments.

use crate::task::{
    domain::{
        Actor, CommentBody, CommentId, CommentPolicy, PermissionError, TaskComment,
        TaskDomainError, TaskId, require_actor,
    },
    ports::{CommentRepository, CommentRepositoryError, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for comment operations.
#[derive(Debug, Error)]
pub enum TaskCommentError {
    /// Caller missing or not allowed.
    #[error(transparent)]
    Permission(#[from] PermissionError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The comment does not exist.
    #[error("comment not found: {0}")]
    NotFound(CommentId),
    /// The body failed validation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Task lookup failed.
    #[error(transparent)]
    Task(#[from] TaskRepositoryError),
    /// Comment repository operation failed.
    #[error(transparent)]
    Repository(#[from] CommentRepositoryError),
}

/// Result type for comment service operations.
pub type TaskCommentResult<T> = Result<T, TaskCommentError>;

/// Adds, edits, deletes and lists comments on tasks.
#[derive(Clone)]
pub struct TaskCommentService<R, CR, C>
where
    R: TaskRepository,
    CR: CommentRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    comments: Arc<CR>,
    clock: Arc<C>,
    policy: CommentPolicy,
}

impl<R, CR, C> TaskCommentService<R, CR, C>
where
    R: TaskRepository,
    CR: CommentRepository,
    C: Clock + Send + Sync,
{
    /// Creates a comment service with the default length policy.
    #[must_use]
    pub fn new(tasks: Arc<R>, comments: Arc<CR>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            comments,
            clock,
            policy: CommentPolicy::default(),
        }
    }

    /// Replaces the length policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: CommentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Adds a comment to a task. Any authenticated caller may comment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommentError::Permission`] without a caller,
    /// [`TaskCommentError::TaskNotFound`] for a missing task,
    /// [`TaskCommentError::Domain`] for an invalid body, or a repository
    /// error.
    pub async fn add_comment(
        &self,
        caller: Option<&Actor>,
        task_id: TaskId,
        body: &str,
    ) -> TaskCommentResult<TaskComment> {
        let actor = require_actor(caller)?;
        if self.tasks.find_by_id(task_id).await?.is_none() {
            return Err(TaskCommentError::TaskNotFound(task_id));
        }
        let comment_body = CommentBody::new(body, &self.policy)?;
        let comment = TaskComment::new(task_id, actor.to_ref(), comment_body, &*self.clock);
        self.comments.store(&comment).await?;
        info!(%task_id, comment_id = %comment.id(), author = %actor.id(), "comment added");
        Ok(comment)
    }

    /// Replaces a comment's body.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommentError::NotFound`] for a missing comment,
    /// [`TaskCommentError::Permission`] unless the caller wrote it or is a
    /// manager, [`TaskCommentError::Domain`] for an invalid body, or a
    /// repository error.
    pub async fn edit_comment(
        &self,
        caller: Option<&Actor>,
        comment_id: CommentId,
        body: &str,
    ) -> TaskCommentResult<TaskComment> {
        let actor = require_actor(caller)?;
        let mut comment = self.load(comment_id).await?;
        actor.ensure_can_moderate(comment.author().user_id, "edit this comment")?;
        let comment_body = CommentBody::new(body, &self.policy)?;
        comment.edit(comment_body, &*self.clock);
        self.comments.update(&comment).await?;
        info!(%comment_id, editor = %actor.id(), "comment edited");
        Ok(comment)
    }

    /// Deletes a comment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommentError::NotFound`] for a missing comment,
    /// [`TaskCommentError::Permission`] unless the caller wrote it or is a
    /// manager, or a repository error.
    pub async fn delete_comment(
        &self,
        caller: Option<&Actor>,
        comment_id: CommentId,
    ) -> TaskCommentResult<()> {
        let actor = require_actor(caller)?;
        let comment = self.load(comment_id).await?;
        actor.ensure_can_moderate(comment.author().user_id, "delete this comment")?;
        self.comments.delete(comment_id).await?;
        info!(%comment_id, deleted_by = %actor.id(), "comment deleted");
        Ok(())
    }

    /// Lists a task's comments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommentError::Permission`] without a caller,
    /// [`TaskCommentError::TaskNotFound`] for a missing task, or a
    /// repository error.
    pub async fn list_comments(
        &self,
        caller: Option<&Actor>,
        task_id: TaskId,
    ) -> TaskCommentResult<Vec<TaskComment>> {
        require_actor(caller)?;
        if self.tasks.find_by_id(task_id).await?.is_none() {
            return Err(TaskCommentError::TaskNotFound(task_id));
        }
        Ok(self.comments.list_for_task(task_id).await?)
    }

    async fn load(&self, comment_id: CommentId) -> TaskCommentResult<TaskComment> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or(TaskCommentError::NotFound(comment_id))
    }
}
