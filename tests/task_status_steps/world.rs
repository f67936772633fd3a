//! Shared world state for task status BDD scenarios.

use std::sync::Arc;

use eyre::WrapErr;
use mockable::DefaultClock;
use rstest::fixture;
use workshop::task::{
    adapters::memory::{
        InMemoryCategoryRepository, InMemoryCommentRepository, InMemoryMaintenanceRepository,
        InMemoryTaskRepository,
    },
    domain::{
        Actor, AssetKind, AssetScope, Category, CategoryRef, Checklist, ChecklistQuestion,
        CompletionUpdateRule, Role, Task, TaskAsset, UserId, VehicleId,
    },
    ports::CategoryRepository,
    services::{
        CreateManualTaskRequest, TaskLifecycleError, TaskLifecycleService,
        TransitionOutcome, TransitionStatusRequest,
    },
};

/// Service type used by the BDD world.
pub type TestLifecycle = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryCommentRepository,
    InMemoryCategoryRepository,
    InMemoryMaintenanceRepository,
    DefaultClock,
>;

/// Scenario world for task status behaviour tests.
pub struct TaskStatusWorld {
    pub service: TestLifecycle,
    pub categories: Arc<InMemoryCategoryRepository>,
    pub maintenance: Arc<InMemoryMaintenanceRepository>,
    pub asset: TaskAsset,
    pub manager: Actor,
    pub caller: Option<Actor>,
    pub pending_title: Option<String>,
    pub pending_category: Option<String>,
    pub pending_rules: Vec<CompletionUpdateRule>,
    pub pending_questions: Vec<ChecklistQuestion>,
    pub task: Option<Task>,
    pub last_transition_result: Option<Result<TransitionOutcome, TaskLifecycleError>>,
}

impl TaskStatusWorld {
    /// Creates a world around a single vehicle.
    #[must_use]
    pub fn new() -> Self {
        let categories = Arc::new(InMemoryCategoryRepository::new());
        let maintenance = Arc::new(
            InMemoryMaintenanceRepository::new()
                .with_fields(AssetKind::Vehicle, ["next_service_date", "notes"]),
        );
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryCommentRepository::new()),
            Arc::clone(&categories),
            Arc::clone(&maintenance),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            categories,
            maintenance,
            asset: TaskAsset::Vehicle(VehicleId::new()),
            manager: Actor::new(UserId::new(), "Alex Planner", Role::Manager),
            caller: None,
            pending_title: None,
            pending_category: None,
            pending_rules: Vec::new(),
            pending_questions: Vec::new(),
            task: None,
            last_transition_result: None,
        }
    }

    /// Creates the scenario's task on first use and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario never named a task or creation fails.
    pub fn ensure_task(&mut self) -> Result<Task, eyre::Report> {
        if let Some(task) = &self.task {
            return Ok(task.clone());
        }
        let title = self
            .pending_title
            .clone()
            .ok_or_else(|| eyre::eyre!("missing task title in scenario world"))?;
        let category_name = self
            .pending_category
            .clone()
            .ok_or_else(|| eyre::eyre!("missing category in scenario world"))?;

        let category = Category::top_level(category_name, self.pending_rules.clone())?;
        run_async(self.categories.store(&category)).wrap_err("store scenario category")?;

        let mut request = CreateManualTaskRequest::new(
            self.asset,
            title,
            CategoryRef {
                category: category.id(),
                subcategory: None,
            },
        );
        if !self.pending_questions.is_empty() {
            request = request.with_checklist(Checklist::new(self.pending_questions.clone()));
        }
        let created = run_async(self.service.create_manual_task(Some(&self.manager), request))
            .wrap_err("create scenario task")?;
        self.task = Some(created.clone());
        Ok(created)
    }

    /// Runs a transition as the current caller and records the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot be created.
    pub fn transition(
        &mut self,
        build: impl FnOnce(TransitionStatusRequest) -> TransitionStatusRequest,
        status: &str,
    ) -> Result<(), eyre::Report> {
        let task = self.ensure_task()?;
        let request = build(TransitionStatusRequest::new(task.id(), status));
        let result = run_async(
            self.service
                .transition_status(self.caller.as_ref(), request),
        );
        if let Ok(ref outcome) = result {
            self.task = Some(outcome.task.clone());
        }
        self.last_transition_result = Some(result);
        Ok(())
    }

    /// Reloads the scenario task from the repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the task was never created or cannot be found.
    pub fn stored_task(&self) -> Result<Task, eyre::Report> {
        let task = self
            .task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing created task"))?;
        run_async(self.service.find_by_id(Some(&self.manager), task.id()))?
            .ok_or_else(|| eyre::eyre!("task {} not found", task.id()))
    }
}

impl Default for TaskStatusWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskStatusWorld {
    TaskStatusWorld::default()
}

/// Returns a caller with `role` covering every asset kind.
#[must_use]
pub fn caller_with_role(role: Role) -> Actor {
    Actor::new(UserId::new(), format!("{} user", role.as_str()), role).with_scope(AssetScope::ALL)
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
