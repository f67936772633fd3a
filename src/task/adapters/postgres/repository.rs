//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{NewTaskRow, TaskChangesetRow, TaskRow},
    schema::tasks,
};
use crate::database::{PgPool, with_connection};
use crate::task::{
    domain::{
        ActorRef, CategoryId, CategoryRef, Checklist, DefectKey, InspectionId,
        LegacyStatusColumns, PersistedTaskData, PlantId, StatusChange, Task, TaskAsset, TaskId,
        TaskOrigin, TaskStatus, TaskTitle, UserId, VehicleId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

const DEFECT_ORIGIN_UNIQUE_INDEX: &str = "idx_tasks_inspection_defect_unique";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        with_connection(&self.pool, TaskRepositoryError::persistence, f).await
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let defect_origin = match task.origin() {
            TaskOrigin::InspectionDefect {
                inspection_id,
                defect_key,
            } => Some((*inspection_id, defect_key.clone())),
            TaskOrigin::Manual => None,
        };
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            // The pre-check gives a semantic error; the unique index still
            // guards the window between check and insert.
            if let Some((inspection_id, defect_key)) = &defect_origin {
                if find_task_by_defect(connection, *inspection_id, defect_key)?.is_some() {
                    return Err(TaskRepositoryError::DuplicateDefectOrigin {
                        inspection_id: *inspection_id,
                        defect_key: defect_key.clone(),
                    });
                }
            }

            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match (&err, &defect_origin) {
                    (
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info),
                        Some((inspection_id, defect_key)),
                    ) if is_defect_origin_unique_violation(info.as_ref()) => {
                        TaskRepositoryError::DuplicateDefectOrigin {
                            inspection_id: *inspection_id,
                            defect_key: defect_key.clone(),
                        }
                    }
                    (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _), _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;

            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = to_changeset(task)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.find(task_id.into_inner()))
                .set(&changeset)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_defect(
        &self,
        inspection_id: InspectionId,
        defect_key: &DefectKey,
    ) -> TaskRepositoryResult<Option<Task>> {
        let lookup_key = defect_key.clone();
        self.run_blocking(move |connection| {
            let row = find_task_by_defect(connection, inspection_id, &lookup_key)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_inspection(
        &self,
        inspection_id: InspectionId,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::inspection_id.eq(inspection_id.into_inner()))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_by_status(&self, status: TaskStatus) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::status.eq(status.as_str()))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> TaskRepositoryResult<serde_json::Value> {
    serde_json::to_value(value).map_err(TaskRepositoryError::persistence)
}

fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    let (inspection_id, defect_key) = match task.origin() {
        TaskOrigin::InspectionDefect {
            inspection_id,
            defect_key,
        } => (
            Some(inspection_id.into_inner()),
            Some(defect_key.as_str().to_owned()),
        ),
        TaskOrigin::Manual => (None, None),
    };
    let (vehicle_id, plant_id) = task.asset().to_columns();
    let category = task.category();
    let legacy = task.legacy();

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        origin_kind: task.origin().kind().to_owned(),
        inspection_id,
        defect_key,
        vehicle_id: vehicle_id.map(VehicleId::into_inner),
        plant_id: plant_id.map(PlantId::into_inner),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        category_id: category.map(|selected| selected.category.into_inner()),
        subcategory_id: category
            .and_then(|selected| selected.subcategory)
            .map(CategoryId::into_inner),
        mileage: task.mileage().map(i64::from),
        status: task.status().as_str().to_owned(),
        status_history: task.status_history().map(to_json).transpose()?,
        logged_at: legacy.logged_at,
        logged_by: legacy.logged_by.map(UserId::into_inner),
        logged_comment: legacy.logged_comment.clone(),
        actioned_at: legacy.actioned_at,
        actioned_by: legacy.actioned_by.map(UserId::into_inner),
        actioned_comment: legacy.actioned_comment.clone(),
        checklist: task.checklist().map(to_json).transpose()?,
        created_by: task.created_by().user_id.into_inner(),
        created_by_name: task.created_by().display_name.clone(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn to_changeset(task: &Task) -> TaskRepositoryResult<TaskChangesetRow> {
    let legacy = task.legacy();
    Ok(TaskChangesetRow {
        status: task.status().as_str().to_owned(),
        status_history: task.status_history().map(to_json).transpose()?,
        logged_at: legacy.logged_at,
        logged_by: legacy.logged_by.map(UserId::into_inner),
        logged_comment: legacy.logged_comment.clone(),
        actioned_at: legacy.actioned_at,
        actioned_by: legacy.actioned_by.map(UserId::into_inner),
        actioned_comment: legacy.actioned_comment.clone(),
        checklist: task.checklist().map(to_json).transpose()?,
        updated_at: task.updated_at(),
    })
}

fn row_to_origin(
    origin_kind: &str,
    inspection_id: Option<uuid::Uuid>,
    defect_key: Option<String>,
) -> TaskRepositoryResult<TaskOrigin> {
    match (origin_kind, inspection_id, defect_key) {
        ("manual", _, _) => Ok(TaskOrigin::Manual),
        ("inspection_defect", Some(inspection), Some(key)) => Ok(TaskOrigin::InspectionDefect {
            inspection_id: InspectionId::from_uuid(inspection),
            defect_key: DefectKey::new(key).map_err(TaskRepositoryError::persistence)?,
        }),
        (other, _, _) => Err(TaskRepositoryError::persistence(std::io::Error::other(
            format!("malformed task origin '{other}'"),
        ))),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        origin_kind,
        inspection_id,
        defect_key,
        vehicle_id,
        plant_id,
        title,
        description,
        category_id,
        subcategory_id,
        mileage: stored_mileage,
        status: stored_status,
        status_history: stored_history,
        logged_at,
        logged_by,
        logged_comment,
        actioned_at,
        actioned_by,
        actioned_comment,
        checklist: stored_checklist,
        created_by,
        created_by_name,
        created_at,
        updated_at,
    } = row;

    let asset = TaskAsset::from_columns(
        vehicle_id.map(VehicleId::from_uuid),
        plant_id.map(PlantId::from_uuid),
    )
    .map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(stored_status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let status_history = stored_history
        .map(serde_json::from_value::<Vec<StatusChange>>)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let checklist = stored_checklist
        .map(serde_json::from_value::<Checklist>)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let mileage = stored_mileage
        .map(u32::try_from)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        origin: row_to_origin(&origin_kind, inspection_id, defect_key)?,
        asset,
        title: TaskTitle::new(title).map_err(TaskRepositoryError::persistence)?,
        description,
        category: category_id.map(|category| CategoryRef {
            category: CategoryId::from_uuid(category),
            subcategory: subcategory_id.map(CategoryId::from_uuid),
        }),
        mileage,
        status,
        status_history,
        legacy: LegacyStatusColumns {
            logged_at,
            logged_by: logged_by.map(UserId::from_uuid),
            logged_comment,
            actioned_at,
            actioned_by: actioned_by.map(UserId::from_uuid),
            actioned_comment,
        },
        checklist,
        created_by: ActorRef {
            user_id: UserId::from_uuid(created_by),
            display_name: created_by_name,
        },
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

fn is_defect_origin_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == DEFECT_ORIGIN_UNIQUE_INDEX)
}

fn find_task_by_defect(
    connection: &mut PgConnection,
    inspection_id: InspectionId,
    defect_key: &DefectKey,
) -> TaskRepositoryResult<Option<TaskRow>> {
    tasks::table
        .filter(tasks::inspection_id.eq(inspection_id.into_inner()))
        .filter(tasks::defect_key.eq(defect_key.as_str()))
        .select(TaskRow::as_select())
        .first::<TaskRow>(connection)
        .optional()
        .map_err(TaskRepositoryError::persistence)
}
