//! Free-text comments attached to workshop tasks.

use super::{ActorRef, CommentId, TaskDomainError, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length limits applied to comment bodies and transition notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPolicy {
    /// Minimum length in characters after trimming.
    pub min_chars: usize,
    /// Maximum length in characters after trimming.
    pub max_chars: usize,
}

impl Default for CommentPolicy {
    fn default() -> Self {
        Self {
            min_chars: 10,
            max_chars: 1000,
        }
    }
}

/// Trimmed comment text within the policy limits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentBody(String);

impl CommentBody {
    /// Validates and trims a comment body.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyComment`],
    /// [`TaskDomainError::CommentTooShort`] or
    /// [`TaskDomainError::CommentTooLong`] when the body breaks the policy.
    pub fn new(value: &str, policy: &CommentPolicy) -> Result<Self, TaskDomainError> {
        let trimmed = value.trim();
        let actual = trimmed.chars().count();
        if actual == 0 {
            return Err(TaskDomainError::EmptyComment);
        }
        if actual < policy.min_chars {
            return Err(TaskDomainError::CommentTooShort {
                min: policy.min_chars,
                actual,
            });
        }
        if actual > policy.max_chars {
            return Err(TaskDomainError::CommentTooLong {
                max: policy.max_chars,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Wraps text loaded from storage without re-validating it.
    #[must_use]
    pub const fn from_persisted(value: String) -> Self {
        Self(value)
    }

    /// Returns the body text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the body, returning its text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CommentBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Comment on a workshop task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskComment {
    id: CommentId,
    task_id: TaskId,
    author: ActorRef,
    body: CommentBody,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCommentData {
    /// Comment identifier.
    pub id: CommentId,
    /// Owning task.
    pub task_id: TaskId,
    /// Author snapshot.
    pub author: ActorRef,
    /// Body text.
    pub body: CommentBody,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskComment {
    /// Creates a new comment.
    #[must_use]
    pub fn new(task_id: TaskId, author: ActorRef, body: CommentBody, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: CommentId::new(),
            task_id,
            author,
            body,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a comment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCommentData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            author: data.author,
            body: data.body,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> &ActorRef {
        &self.author
    }

    /// Returns the body.
    #[must_use]
    pub const fn body(&self) -> &CommentBody {
        &self.body
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last edit timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when the comment was edited after creation.
    #[must_use]
    pub fn is_edited(&self) -> bool {
        self.updated_at > self.created_at
    }

    /// Replaces the body and bumps `updated_at`.
    pub fn edit(&mut self, body: CommentBody, clock: &impl Clock) {
        self.body = body;
        self.updated_at = clock.utc();
    }
}
