//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use workshop::task::{
    adapters::memory::{
        InMemoryCategoryRepository, InMemoryCommentRepository, InMemoryMaintenanceRepository,
        InMemoryTaskRepository,
    },
    domain::{
        Actor, AssetKind, AssetScope, Category, CategoryRef, CompletionUpdateRule,
        CompletionValueType, MaintenanceTarget, Role, UserId,
    },
    ports::CategoryRepository,
    services::{TaskCommentService, TaskLifecycleService},
};

/// Lifecycle service over the in-memory adapters.
pub type Lifecycle = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryCommentRepository,
    InMemoryCategoryRepository,
    InMemoryMaintenanceRepository,
    DefaultClock,
>;

/// Comment service over the in-memory adapters.
pub type Comments =
    TaskCommentService<InMemoryTaskRepository, InMemoryCommentRepository, DefaultClock>;

/// Services and stores shared by one test.
pub struct Workshop {
    pub tasks: Arc<InMemoryTaskRepository>,
    pub categories: Arc<InMemoryCategoryRepository>,
    pub maintenance: Arc<InMemoryMaintenanceRepository>,
    pub lifecycle: Lifecycle,
    pub comments: Comments,
}

/// Provides services wired to fresh in-memory stores.
///
/// The vehicle maintenance table knows `next_service_date`,
/// `next_service_mileage` and `notes`; plant accepts any field.
#[fixture]
pub fn shop() -> Workshop {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let comments = Arc::new(InMemoryCommentRepository::new());
    let categories = Arc::new(InMemoryCategoryRepository::new());
    let maintenance = Arc::new(InMemoryMaintenanceRepository::new().with_fields(
        AssetKind::Vehicle,
        ["next_service_date", "next_service_mileage", "notes"],
    ));
    let clock = Arc::new(DefaultClock);
    Workshop {
        lifecycle: TaskLifecycleService::new(
            Arc::clone(&tasks),
            Arc::clone(&comments),
            Arc::clone(&categories),
            Arc::clone(&maintenance),
            Arc::clone(&clock),
        ),
        comments: TaskCommentService::new(Arc::clone(&tasks), comments, clock),
        tasks,
        categories,
        maintenance,
    }
}

/// Returns an actor with `role` and access to every asset kind.
#[must_use]
pub fn user(role: Role, name: &str) -> Actor {
    Actor::new(UserId::new(), name, role).with_scope(AssetScope::ALL)
}

/// Builds a completion rule with a generated label.
///
/// # Errors
///
/// Returns an error if the field name is invalid.
pub fn rule(
    target: MaintenanceTarget,
    field: &str,
    value_type: CompletionValueType,
) -> Result<CompletionUpdateRule, eyre::Report> {
    CompletionUpdateRule::new(
        target,
        field,
        value_type,
        format!("New {}", field.replace('_', " ")),
    )
    .map_err(Into::into)
}

/// Stores a "Servicing" category with an "Interim" subcategory and returns
/// a reference to the pair.
///
/// The category sets `next_service_date` and `notes` on vehicles; the
/// subcategory overrides `notes` and adds `mot_due_date`, a column the
/// vehicle table does not have.
///
/// # Errors
///
/// Returns an error if a category cannot be built or stored.
pub async fn servicing(shop: &Workshop) -> Result<CategoryRef, eyre::Report> {
    let category = Category::top_level(
        "Servicing",
        vec![
            rule(
                MaintenanceTarget::VehicleMaintenance,
                "next_service_date",
                CompletionValueType::Date,
            )?,
            rule(
                MaintenanceTarget::VehicleMaintenance,
                "notes",
                CompletionValueType::Text,
            )?,
        ],
    )?;
    let interim = Category::subcategory(
        "Interim",
        &category,
        vec![
            rule(
                MaintenanceTarget::VehicleMaintenance,
                "notes",
                CompletionValueType::Text,
            )?,
            rule(
                MaintenanceTarget::VehicleMaintenance,
                "mot_due_date",
                CompletionValueType::Date,
            )?,
        ],
    )?;
    shop.categories.store(&category).await?;
    shop.categories.store(&interim).await?;
    Ok(CategoryRef {
        category: category.id(),
        subcategory: Some(interim.id()),
    })
}
