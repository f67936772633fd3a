//! Application services for task lifecycle orchestration.

mod comments;
mod completion;
mod lifecycle;

pub use comments::{TaskCommentError, TaskCommentResult, TaskCommentService};
pub use completion::{
    AppliedCompletionUpdate, CompletionReport, CompletionUpdateApplier, FailedCompletionUpdate,
    SkipReason, SkippedCompletionUpdate,
};
pub use lifecycle::{
    CreateManualTaskRequest, DefectReport, SyncDefectsRequest, SyncReport, TaskLifecycleError,
    TaskLifecycleResult, TaskLifecycleService, TransitionOutcome, TransitionStatusRequest,
};
