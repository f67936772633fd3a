//! Task aggregate root and related task lifecycle types.

use super::{
    ActorRef, CategoryRef, Checklist, DefectKey, InspectionId, LegacyStatusColumns,
    StatusChange, TaskAsset, TaskDomainError, TaskId, TaskStatus, TaskTitle,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Where a task came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskOrigin {
    /// Generated from a defect recorded on an inspection.
    InspectionDefect {
        /// Inspection that recorded the defect.
        inspection_id: InspectionId,
        /// Checklist item the defect was recorded against.
        defect_key: DefectKey,
    },
    /// Created by hand in the workshop.
    Manual,
}

impl TaskOrigin {
    /// Returns the storage discriminator.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InspectionDefect { .. } => "inspection_defect",
            Self::Manual => "manual",
        }
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    origin: TaskOrigin,
    asset: TaskAsset,
    title: TaskTitle,
    description: Option<String>,
    category: Option<CategoryRef>,
    mileage: Option<u32>,
    status: TaskStatus,
    status_history: Option<Vec<StatusChange>>,
    legacy: LegacyStatusColumns,
    checklist: Option<Checklist>,
    created_by: ActorRef,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for a hand-created workshop task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewManualTask {
    /// Target asset.
    pub asset: TaskAsset,
    /// Title.
    pub title: TaskTitle,
    /// Optional work description.
    pub description: Option<String>,
    /// Validated category selection.
    pub category: CategoryRef,
    /// Odometer reading when the task was raised.
    pub mileage: Option<u32>,
    /// Optional checklist form.
    pub checklist: Option<Checklist>,
    /// Creator.
    pub created_by: ActorRef,
}

/// Parameter object for a task generated from an inspection defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDefectTask {
    /// Inspection that recorded the defect.
    pub inspection_id: InspectionId,
    /// Checklist item key of the defect.
    pub defect_key: DefectKey,
    /// Inspected asset.
    pub asset: TaskAsset,
    /// Title, usually the checklist item label.
    pub title: TaskTitle,
    /// Inspector's note.
    pub description: Option<String>,
    /// Odometer reading at inspection time.
    pub mileage: Option<u32>,
    /// Inspector.
    pub created_by: ActorRef,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Task identifier.
    pub id: TaskId,
    /// Origin.
    pub origin: TaskOrigin,
    /// Target asset.
    pub asset: TaskAsset,
    /// Title.
    pub title: TaskTitle,
    /// Description.
    pub description: Option<String>,
    /// Category selection.
    pub category: Option<CategoryRef>,
    /// Mileage.
    pub mileage: Option<u32>,
    /// Current status.
    pub status: TaskStatus,
    /// Structured history, absent on rows that predate it.
    pub status_history: Option<Vec<StatusChange>>,
    /// Legacy scalar status columns.
    pub legacy: LegacyStatusColumns,
    /// Checklist form.
    pub checklist: Option<Checklist>,
    /// Creator.
    pub created_by: ActorRef,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A requested status change with its actor and note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    /// Target status.
    pub to: TaskStatus,
    /// Who is making the change.
    pub actor: ActorRef,
    /// Optional note, already validated by the caller.
    pub comment: Option<String>,
}

impl Task {
    /// Creates a hand-made workshop task in `pending`.
    #[must_use]
    pub fn new_manual(params: NewManualTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            origin: TaskOrigin::Manual,
            asset: params.asset,
            title: params.title,
            description: params.description,
            category: Some(params.category),
            mileage: params.mileage,
            status: TaskStatus::Pending,
            status_history: Some(Vec::new()),
            legacy: LegacyStatusColumns::default(),
            checklist: params.checklist,
            created_by: params.created_by,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Creates a `pending` task from an inspection defect.
    #[must_use]
    pub fn new_from_defect(params: NewDefectTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            origin: TaskOrigin::InspectionDefect {
                inspection_id: params.inspection_id,
                defect_key: params.defect_key,
            },
            asset: params.asset,
            title: params.title,
            description: params.description,
            category: None,
            mileage: params.mileage,
            status: TaskStatus::Pending,
            status_history: Some(Vec::new()),
            legacy: LegacyStatusColumns::default(),
            checklist: None,
            created_by: params.created_by,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            origin: data.origin,
            asset: data.asset,
            title: data.title,
            description: data.description,
            category: data.category,
            mileage: data.mileage,
            status: data.status,
            status_history: data.status_history,
            legacy: data.legacy,
            checklist: data.checklist,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task origin.
    #[must_use]
    pub const fn origin(&self) -> &TaskOrigin {
        &self.origin
    }

    /// Returns the target asset.
    #[must_use]
    pub const fn asset(&self) -> TaskAsset {
        self.asset
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the category selection, if any.
    #[must_use]
    pub const fn category(&self) -> Option<CategoryRef> {
        self.category
    }

    /// Returns the recorded mileage, if any.
    #[must_use]
    pub const fn mileage(&self) -> Option<u32> {
        self.mileage
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the structured status history, when the task has one.
    #[must_use]
    pub fn status_history(&self) -> Option<&[StatusChange]> {
        self.status_history.as_deref()
    }

    /// Returns the legacy scalar status columns.
    #[must_use]
    pub const fn legacy(&self) -> &LegacyStatusColumns {
        &self.legacy
    }

    /// Returns the attached checklist, if any.
    #[must_use]
    pub const fn checklist(&self) -> Option<&Checklist> {
        self.checklist.as_ref()
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> &ActorRef {
        &self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the authoritative list of status changes: the structured
    /// history when present, otherwise the legacy-column fallback.
    #[must_use]
    pub fn status_changes(&self) -> Cow<'_, [StatusChange]> {
        self.status_history.as_deref().map_or_else(
            || Cow::Owned(self.legacy.to_history()),
            Cow::Borrowed,
        )
    }

    /// Records a checklist answer.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownChecklistQuestion`] when the task has
    /// no checklist or the checklist has no question with `key`.
    pub fn answer_checklist(
        &mut self,
        key: &str,
        answer: impl Into<String>,
    ) -> Result<(), TaskDomainError> {
        self.checklist
            .as_mut()
            .ok_or_else(|| TaskDomainError::UnknownChecklistQuestion(key.to_owned()))?
            .answer(key, answer)
    }

    /// Checks that every required checklist question is answered.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnansweredChecklist`] listing the open keys.
    pub fn ensure_checklist_complete(&self) -> Result<(), TaskDomainError> {
        let keys = self
            .checklist
            .as_ref()
            .map(Checklist::unanswered_required)
            .unwrap_or_default();
        if keys.is_empty() {
            Ok(())
        } else {
            Err(TaskDomainError::UnansweredChecklist {
                task_id: self.id,
                keys,
            })
        }
    }

    /// Moves the task to a new status and appends one history entry.
    ///
    /// A task without structured history first has its legacy columns
    /// materialised into history, so the timeline reads the same before and
    /// after. The legacy columns are kept current as well.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the workflow
    /// forbids the move, or [`TaskDomainError::UnansweredChecklist`] when
    /// completing with open required questions.
    pub fn transition_to(
        &mut self,
        transition: StatusTransition,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let StatusTransition { to, actor, comment } = transition;
        if !self.status.can_transition_to(to) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to,
            });
        }
        if to == TaskStatus::Completed {
            self.ensure_checklist_complete()?;
        }

        let mut history = self
            .status_history
            .take()
            .unwrap_or_else(|| self.legacy.to_history());
        let change = StatusChange {
            status: to,
            changed_at: clock.utc(),
            changed_by: Some(actor),
            comment,
        };
        self.legacy.record(&change);
        self.updated_at = change.changed_at;
        self.status = to;
        history.push(change);
        self.status_history = Some(history);
        Ok(())
    }
}
