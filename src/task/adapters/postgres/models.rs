//! Diesel row models for task persistence.

use super::schema::{categories, task_comments, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: uuid::Uuid,
    pub origin_kind: String,
    pub inspection_id: Option<uuid::Uuid>,
    pub defect_key: Option<String>,
    pub vehicle_id: Option<uuid::Uuid>,
    pub plant_id: Option<uuid::Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<uuid::Uuid>,
    pub subcategory_id: Option<uuid::Uuid>,
    pub mileage: Option<i64>,
    pub status: String,
    pub status_history: Option<Value>,
    pub logged_at: Option<DateTime<Utc>>,
    pub logged_by: Option<uuid::Uuid>,
    pub logged_comment: Option<String>,
    pub actioned_at: Option<DateTime<Utc>>,
    pub actioned_by: Option<uuid::Uuid>,
    pub actioned_comment: Option<String>,
    pub checklist: Option<Value>,
    pub created_by: uuid::Uuid,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    pub id: uuid::Uuid,
    pub origin_kind: String,
    pub inspection_id: Option<uuid::Uuid>,
    pub defect_key: Option<String>,
    pub vehicle_id: Option<uuid::Uuid>,
    pub plant_id: Option<uuid::Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<uuid::Uuid>,
    pub subcategory_id: Option<uuid::Uuid>,
    pub mileage: Option<i64>,
    pub status: String,
    pub status_history: Option<Value>,
    pub logged_at: Option<DateTime<Utc>>,
    pub logged_by: Option<uuid::Uuid>,
    pub logged_comment: Option<String>,
    pub actioned_at: Option<DateTime<Utc>>,
    pub actioned_by: Option<uuid::Uuid>,
    pub actioned_comment: Option<String>,
    pub checklist: Option<Value>,
    pub created_by: uuid::Uuid,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable task columns written by `update`.
///
/// `None` clears a column, so reopening a task nulls the `actioned_*` fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangesetRow {
    pub status: String,
    pub status_history: Option<Value>,
    pub logged_at: Option<DateTime<Utc>>,
    pub logged_by: Option<uuid::Uuid>,
    pub logged_comment: Option<String>,
    pub actioned_at: Option<DateTime<Utc>>,
    pub actioned_by: Option<uuid::Uuid>,
    pub actioned_comment: Option<String>,
    pub checklist: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

/// Query, insert and update row for comments.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    pub id: uuid::Uuid,
    pub task_id: uuid::Uuid,
    pub author_id: uuid::Uuid,
    pub author_name: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query and insert row for categories.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: uuid::Uuid,
    pub name: String,
    pub parent_id: Option<uuid::Uuid>,
    pub completion_updates: Value,
}
