//! Domain model for workshop task lifecycle management.
//!
//! The task domain models task creation (by hand or from inspection defects),
//! the status workflow, comments, categories with completion rules and the
//! read-side timeline, while keeping all infrastructure concerns outside of
//! the domain boundary.

mod actor;
mod asset;
mod category;
mod checklist;
mod comment;
mod error;
mod ids;
mod status;
mod task;
mod timeline;

pub use actor::{Actor, ActorRef, AssetScope, Role, require_actor};
pub use asset::{AssetKind, TaskAsset};
pub use category::{
    Category, CategoryRef, CompletionUpdateRule, CompletionValue, CompletionValueType, FieldName,
    MaintenanceTarget, ValidatedCompletionUpdate, resolve_completion_rules,
};
pub use checklist::{Checklist, ChecklistQuestion};
pub use comment::{CommentBody, CommentPolicy, PersistedCommentData, TaskComment};
pub use error::{ParseTaskStatusError, ParseValueError, PermissionError, TaskDomainError};
pub use ids::{
    CategoryId, CommentId, DefectKey, InspectionId, PlantId, TaskId, TaskTitle, UserId, VehicleId,
};
pub use status::{LegacyStatusColumns, StatusChange, TaskStatus};
pub use task::{
    NewDefectTask, NewManualTask, PersistedTaskData, StatusTransition, Task, TaskOrigin,
};
pub use timeline::{TimelineEntry, TimelineEntryKind, build_timeline};
