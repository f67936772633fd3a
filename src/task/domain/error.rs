//! Error types for task domain validation and parsing.

use super::{CategoryId, CompletionValueType, TaskId, TaskStatus, UserId};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The defect key is empty after trimming.
    #[error("defect key must not be empty")]
    EmptyDefectKey,

    /// A persisted row references both or neither of vehicle and plant.
    #[error("task must reference exactly one of vehicle or plant")]
    InvalidAssetReference,

    /// The status workflow does not permit the requested transition.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// Completion was requested while required checklist questions are open.
    #[error("task {task_id} has unanswered required checklist questions: {}", keys.join(", "))]
    UnansweredChecklist {
        /// Task being completed.
        task_id: TaskId,
        /// Keys of the unanswered questions, in checklist order.
        keys: Vec<String>,
    },

    /// An answer was supplied for a question the checklist does not contain.
    #[error("unknown checklist question: {0}")]
    UnknownChecklistQuestion(String),

    /// The comment body is empty after trimming.
    #[error("comment must not be empty")]
    EmptyComment,

    /// The comment body is shorter than the configured minimum.
    #[error("comment must be at least {min} characters, got {actual}")]
    CommentTooShort {
        /// Minimum character count.
        min: usize,
        /// Actual character count.
        actual: usize,
    },

    /// The comment body is longer than the configured maximum.
    #[error("comment must be at most {max} characters, got {actual}")]
    CommentTooLong {
        /// Maximum character count.
        max: usize,
        /// Actual character count.
        actual: usize,
    },

    /// The category name is empty after trimming.
    #[error("category name must not be empty")]
    EmptyCategoryName,

    /// A subcategory was used where a top-level category is required.
    #[error("category {0} is not a top-level category")]
    NotTopLevelCategory(CategoryId),

    /// A top-level category was used where a subcategory is required.
    #[error("category {0} is not a subcategory")]
    NotSubcategory(CategoryId),

    /// The subcategory does not belong to the task's category.
    #[error("subcategory {subcategory} does not belong to category {category}")]
    SubcategoryMismatch {
        /// Task category.
        category: CategoryId,
        /// Offending subcategory.
        subcategory: CategoryId,
    },

    /// A completion rule names an invalid maintenance column.
    #[error(
        "invalid completion field '{0}' (lowercase letters, digits and underscores, starting with a letter)"
    )]
    InvalidFieldName(String),

    /// A completion rule has no label.
    #[error("completion rule label must not be empty")]
    EmptyRuleLabel,

    /// A completion value was supplied for a field no rule declares.
    #[error("no completion rule declares field '{0}'")]
    UnknownCompletionField(String),

    /// A completion value does not match the rule's declared type.
    #[error("invalid {expected} value for '{field}': {value:?}")]
    InvalidCompletionValue {
        /// Field being written.
        field: String,
        /// Declared value type.
        expected: CompletionValueType,
        /// Raw value supplied by the user.
        value: String,
    },
}

/// Error returned while parsing task statuses from requests or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing enum-like scalar values from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseValueError {
    /// Name of the value kind being parsed.
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}

/// Caller is missing or lacks the rights for an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionError {
    /// No authenticated caller accompanied the request.
    #[error("authentication required")]
    Unauthenticated,

    /// The caller is authenticated but not allowed to perform the action.
    #[error("user {user_id} is not allowed to {action}")]
    Forbidden {
        /// Caller identifier.
        user_id: UserId,
        /// Human-readable action description.
        action: &'static str,
    },
}
