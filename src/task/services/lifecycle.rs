//! Service layer for task creation, defect sync, status transitions and
//! timeline reads.

use super::completion::{CompletionReport, CompletionUpdateApplier};
use crate::task::{
    domain::{
        Actor, AssetKind, Category, CategoryId, CategoryRef, Checklist, CommentBody, CommentPolicy,
        CompletionUpdateRule, DefectKey, InspectionId, NewDefectTask, NewManualTask,
        ParseTaskStatusError, PermissionError, StatusTransition, Task, TaskAsset, TaskDomainError,
        TaskId, TaskStatus, TaskTitle, TimelineEntry, ValidatedCompletionUpdate, build_timeline,
        require_actor, resolve_completion_rules,
    },
    ports::{
        CategoryRepository, CategoryRepositoryError, CommentRepository, CommentRepositoryError,
        MaintenanceRepository, TaskRepository, TaskRepositoryError,
    },
};
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for creating a task by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateManualTaskRequest {
    asset: TaskAsset,
    title: String,
    category: CategoryRef,
    description: Option<String>,
    mileage: Option<u32>,
    checklist: Option<Checklist>,
}

impl CreateManualTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(asset: TaskAsset, title: impl Into<String>, category: CategoryRef) -> Self {
        Self {
            asset,
            title: title.into(),
            category,
            description: None,
            mileage: None,
            checklist: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the odometer reading.
    #[must_use]
    pub const fn with_mileage(mut self, mileage: u32) -> Self {
        self.mileage = Some(mileage);
        self
    }

    /// Attaches a checklist form.
    #[must_use]
    pub fn with_checklist(mut self, checklist: Checklist) -> Self {
        self.checklist = Some(checklist);
        self
    }
}

/// One failed item reported by an inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefectReport {
    /// Checklist item key, unique within the inspection.
    pub defect_key: String,
    /// Human-readable item label, used as the task title.
    pub item_label: String,
    /// Inspector's note, used as the task description.
    pub comment: Option<String>,
}

impl DefectReport {
    /// Creates a defect report without a note.
    #[must_use]
    pub fn new(defect_key: impl Into<String>, item_label: impl Into<String>) -> Self {
        Self {
            defect_key: defect_key.into(),
            item_label: item_label.into(),
            comment: None,
        }
    }

    /// Sets the inspector's note.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Request payload for turning an inspection's defects into tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncDefectsRequest {
    inspection_id: InspectionId,
    asset: TaskAsset,
    mileage: Option<u32>,
    defects: Vec<DefectReport>,
}

impl SyncDefectsRequest {
    /// Creates a request for the inspected asset.
    #[must_use]
    pub fn new(
        inspection_id: InspectionId,
        asset: TaskAsset,
        defects: impl IntoIterator<Item = DefectReport>,
    ) -> Self {
        Self {
            inspection_id,
            asset,
            mileage: None,
            defects: defects.into_iter().collect(),
        }
    }

    /// Sets the odometer reading taken during the inspection.
    #[must_use]
    pub const fn with_mileage(mut self, mileage: u32) -> Self {
        self.mileage = Some(mileage);
        self
    }
}

/// Outcome of a defect sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Tasks created by this run.
    pub created: Vec<TaskId>,
    /// Defects that already had a task.
    pub skipped: Vec<DefectKey>,
}

/// Request payload for moving a task to another status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionStatusRequest {
    task_id: TaskId,
    status: String,
    comment: Option<String>,
    checklist_answers: BTreeMap<String, String>,
    completion_values: BTreeMap<String, String>,
}

impl TransitionStatusRequest {
    /// Creates a request; `status` is parsed by the service.
    #[must_use]
    pub fn new(task_id: TaskId, status: impl Into<String>) -> Self {
        Self {
            task_id,
            status: status.into(),
            comment: None,
            checklist_answers: BTreeMap::new(),
            completion_values: BTreeMap::new(),
        }
    }

    /// Sets the transition comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds a checklist answer merged before completion.
    #[must_use]
    pub fn with_checklist_answer(
        mut self,
        key: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        self.checklist_answers.insert(key.into(), answer.into());
        self
    }

    /// Adds a raw completion value keyed by maintenance field.
    #[must_use]
    pub fn with_completion_value(
        mut self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.completion_values.insert(field.into(), value.into());
        self
    }
}

/// Result of a successful status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// Task as persisted after the transition.
    pub task: Task,
    /// Maintenance writes, present when the task was completed.
    pub completion: Option<CompletionReport>,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Caller missing or not allowed.
    #[error(transparent)]
    Permission(#[from] PermissionError),
    /// The requested status is not one of the workflow values.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// A referenced category does not exist.
    #[error("category not found: {0}")]
    CategoryNotFound(CategoryId),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Category repository operation failed.
    #[error(transparent)]
    Category(#[from] CategoryRepositoryError),
    /// Comment repository operation failed.
    #[error(transparent)]
    Comment(#[from] CommentRepositoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, CR, CatR, M, C>
where
    R: TaskRepository,
    CR: CommentRepository,
    CatR: CategoryRepository,
    M: MaintenanceRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    comments: Arc<CR>,
    categories: Arc<CatR>,
    applier: CompletionUpdateApplier<M>,
    clock: Arc<C>,
    comment_policy: CommentPolicy,
}

impl<R, CR, CatR, M, C> TaskLifecycleService<R, CR, CatR, M, C>
where
    R: TaskRepository,
    CR: CommentRepository,
    CatR: CategoryRepository,
    M: MaintenanceRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service with the default comment policy.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        comments: Arc<CR>,
        categories: Arc<CatR>,
        maintenance: Arc<M>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            repository,
            comments,
            categories,
            applier: CompletionUpdateApplier::new(maintenance),
            clock,
            comment_policy: CommentPolicy::default(),
        }
    }

    /// Replaces the policy used for transition comments.
    #[must_use]
    pub const fn with_comment_policy(mut self, policy: CommentPolicy) -> Self {
        self.comment_policy = policy;
        self
    }

    /// Creates a task by hand.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Permission`] when the caller is missing
    /// or may not work on the asset, [`TaskLifecycleError::CategoryNotFound`]
    /// for an unknown category, [`TaskLifecycleError::Domain`] for invalid
    /// input, or a repository error.
    pub async fn create_manual_task(
        &self,
        caller: Option<&Actor>,
        request: CreateManualTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let actor = require_actor(caller)?;
        actor.ensure_can_work_on(request.asset, "create tasks")?;

        let (category, subcategory) = self.load_categories(request.category).await?;
        let category_ref = CategoryRef::validate(&category, subcategory.as_ref())?;
        let title = TaskTitle::new(request.title)?;

        let task = Task::new_manual(
            NewManualTask {
                asset: request.asset,
                title,
                description: non_blank(request.description),
                category: category_ref,
                mileage: request.mileage,
                checklist: request.checklist,
                created_by: actor.to_ref(),
            },
            &*self.clock,
        );
        self.repository.store(&task).await?;
        info!(task_id = %task.id(), asset = %task.asset(), created_by = %actor.id(), "manual task created");
        Ok(task)
    }

    /// Creates a pending task for every defect not yet synced.
    ///
    /// All defects are validated before any task is stored, so bad input
    /// creates nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Permission`] without a caller,
    /// [`TaskLifecycleError::Domain`] for a blank key or label, or a
    /// repository error other than a duplicate defect.
    pub async fn sync_inspection_defects(
        &self,
        caller: Option<&Actor>,
        request: SyncDefectsRequest,
    ) -> TaskLifecycleResult<SyncReport> {
        let actor = require_actor(caller)?;
        let SyncDefectsRequest {
            inspection_id,
            asset,
            mileage,
            defects,
        } = request;

        let drafts = defects
            .into_iter()
            .map(|defect| -> Result<NewDefectTask, TaskDomainError> {
                Ok(NewDefectTask {
                    inspection_id,
                    defect_key: DefectKey::new(defect.defect_key)?,
                    asset,
                    title: TaskTitle::new(defect.item_label)?,
                    description: non_blank(defect.comment),
                    mileage,
                    created_by: actor.to_ref(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = SyncReport::default();
        for draft in drafts {
            let defect_key = draft.defect_key.clone();
            if self
                .repository
                .find_by_defect(inspection_id, &defect_key)
                .await?
                .is_some()
            {
                debug!(%inspection_id, %defect_key, "defect already has a task");
                report.skipped.push(defect_key);
                continue;
            }

            let task = Task::new_from_defect(draft, &*self.clock);
            match self.repository.store(&task).await {
                Ok(()) => report.created.push(task.id()),
                Err(TaskRepositoryError::DuplicateDefectOrigin { .. }) => {
                    debug!(%inspection_id, %defect_key, "defect task created concurrently");
                    report.skipped.push(defect_key);
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(
            %inspection_id,
            created = report.created.len(),
            skipped = report.skipped.len(),
            "inspection defects synced"
        );
        Ok(report)
    }

    /// Moves a task to the requested status.
    ///
    /// Completion also merges checklist answers, validates completion values
    /// and, once the new status is stored, writes them into the asset's
    /// maintenance record. Those writes are best-effort; their outcome is in
    /// [`TransitionOutcome::completion`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Permission`] without a caller or
    /// without rights, [`TaskLifecycleError::InvalidStatus`] for an unknown
    /// status, [`TaskLifecycleError::NotFound`] for a missing task,
    /// [`TaskLifecycleError::Domain`] for a bad comment, checklist, value or
    /// workflow move, or a repository error.
    pub async fn transition_status(
        &self,
        caller: Option<&Actor>,
        request: TransitionStatusRequest,
    ) -> TaskLifecycleResult<TransitionOutcome> {
        let actor = require_actor(caller)?;
        let target = TaskStatus::try_from(request.status.as_str())?;
        let mut task = self
            .repository
            .find_by_id(request.task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(request.task_id))?;

        actor.ensure_can_work_on(task.asset(), "change task status")?;
        if task.status().is_reopen(target) {
            actor.ensure_can_reopen()?;
        }

        let comment = request
            .comment
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .map(|text| CommentBody::new(text, &self.comment_policy))
            .transpose()?
            .map(CommentBody::into_inner);

        let completion = if target == TaskStatus::Completed {
            for (key, answer) in request.checklist_answers {
                task.answer_checklist(&key, answer)?;
            }
            task.ensure_checklist_complete()?;
            let rules = self.completion_rules(&task).await?;
            let updates = validate_completion_values(
                task.asset().kind(),
                &rules,
                &request.completion_values,
            )?;
            Some((rules, updates))
        } else {
            None
        };

        let from = task.status();
        task.transition_to(
            StatusTransition {
                to: target,
                actor: actor.to_ref(),
                comment,
            },
            &*self.clock,
        )?;
        self.repository.update(&task).await?;
        info!(task_id = %task.id(), %from, to = %target, actor = %actor.id(), "task status changed");

        let report = match completion {
            Some((rules, updates)) => Some(
                self.applier
                    .apply(task.asset(), &rules, &updates, &actor.to_ref())
                    .await,
            ),
            None => None,
        };
        Ok(TransitionOutcome {
            task,
            completion: report,
        })
    }

    /// Returns the task's ordered timeline.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Permission`] without a caller,
    /// [`TaskLifecycleError::NotFound`] for a missing task, or a repository
    /// error.
    pub async fn timeline(
        &self,
        caller: Option<&Actor>,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Vec<TimelineEntry>> {
        require_actor(caller)?;
        let task = self
            .repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))?;
        let comments = self.comments.list_for_task(task_id).await?;
        Ok(build_timeline(&task, &comments))
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Permission`] without a caller or
    /// [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn find_by_id(
        &self,
        caller: Option<&Actor>,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Option<Task>> {
        require_actor(caller)?;
        Ok(self.repository.find_by_id(task_id).await?)
    }

    /// Lists tasks in `status`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Permission`] without a caller or
    /// [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn list_by_status(
        &self,
        caller: Option<&Actor>,
        status: TaskStatus,
    ) -> TaskLifecycleResult<Vec<Task>> {
        require_actor(caller)?;
        Ok(self.repository.list_by_status(status).await?)
    }

    async fn load_categories(
        &self,
        selection: CategoryRef,
    ) -> TaskLifecycleResult<(Category, Option<Category>)> {
        let category = self.load_category(selection.category).await?;
        let subcategory = match selection.subcategory {
            Some(id) => Some(self.load_category(id).await?),
            None => None,
        };
        Ok((category, subcategory))
    }

    async fn load_category(&self, id: CategoryId) -> TaskLifecycleResult<Category> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(TaskLifecycleError::CategoryNotFound(id))
    }

    async fn completion_rules(&self, task: &Task) -> TaskLifecycleResult<Vec<CompletionUpdateRule>> {
        let Some(selection) = task.category() else {
            return Ok(Vec::new());
        };
        let (category, subcategory) = self.load_categories(selection).await?;
        Ok(resolve_completion_rules(&category, subcategory.as_ref()))
    }
}

/// Validates raw completion values against the rules for `kind`.
///
/// Rules for the other asset kind are ignored here; the applier reports
/// them as skipped.
fn validate_completion_values(
    kind: AssetKind,
    rules: &[CompletionUpdateRule],
    values: &BTreeMap<String, String>,
) -> Result<Vec<ValidatedCompletionUpdate>, TaskDomainError> {
    let mut validated = Vec::new();
    for (field, raw) in values {
        let rule = rules
            .iter()
            .filter(|rule| rule.target.asset_kind() == kind)
            .find(|rule| rule.field.as_str() == field)
            .ok_or_else(|| TaskDomainError::UnknownCompletionField(field.clone()))?;
        validated.push(rule.validate(raw)?);
    }
    Ok(validated)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
