//! `PostgreSQL` error log stored in `error_logs`.

use crate::database::{PgPool, with_connection};
use crate::error::ErrorCategory;
use crate::error_log::{
    domain::{ErrorLogEntry, ErrorLogId, PersistedErrorLogData},
    ports::{ErrorLogRepository, ErrorLogRepositoryError, ErrorLogRepositoryResult},
};
use crate::task::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

diesel::table! {
    /// Recorded internal errors.
    error_logs (id) {
        /// Entry identifier.
        id -> Uuid,
        /// When the error happened.
        occurred_at -> Timestamptz,
        /// Error category.
        #[max_length = 20]
        category -> Varchar,
        /// Error message.
        message -> Text,
        /// SHA-256 grouping fingerprint.
        #[max_length = 64]
        fingerprint -> Varchar,
        /// Request path.
        request_path -> Nullable<Text>,
        /// Caller.
        actor_id -> Nullable<Uuid>,
        /// Free-form detail.
        context -> Jsonb,
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = error_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct ErrorLogRow {
    id: uuid::Uuid,
    occurred_at: DateTime<Utc>,
    category: String,
    message: String,
    fingerprint: String,
    request_path: Option<String>,
    actor_id: Option<uuid::Uuid>,
    context: serde_json::Value,
}

/// `PostgreSQL`-backed error log.
#[derive(Debug, Clone)]
pub struct PostgresErrorLogRepository {
    pool: PgPool,
}

impl PostgresErrorLogRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ErrorLogRepository for PostgresErrorLogRepository {
    async fn record(&self, entry: &ErrorLogEntry) -> ErrorLogRepositoryResult<()> {
        let row = ErrorLogRow {
            id: entry.id().into_inner(),
            occurred_at: entry.occurred_at(),
            category: entry.category().as_str().to_owned(),
            message: entry.message().to_owned(),
            fingerprint: entry.fingerprint().to_owned(),
            request_path: entry.request_path().map(str::to_owned),
            actor_id: entry.actor().map(UserId::into_inner),
            context: entry.context().clone(),
        };
        with_connection(
            &self.pool,
            ErrorLogRepositoryError::persistence,
            move |connection| {
                diesel::insert_into(error_logs::table)
                    .values(&row)
                    .execute(connection)
                    .map_err(ErrorLogRepositoryError::persistence)?;
                Ok(())
            },
        )
        .await
    }

    async fn recent(&self, limit: usize) -> ErrorLogRepositoryResult<Vec<ErrorLogEntry>> {
        let row_limit = i64::try_from(limit).unwrap_or(i64::MAX);
        with_connection(
            &self.pool,
            ErrorLogRepositoryError::persistence,
            move |connection| {
                let rows = error_logs::table
                    .order((error_logs::occurred_at.desc(), error_logs::id.desc()))
                    .limit(row_limit)
                    .select(ErrorLogRow::as_select())
                    .load::<ErrorLogRow>(connection)
                    .map_err(ErrorLogRepositoryError::persistence)?;
                rows.into_iter().map(row_to_entry).collect()
            },
        )
        .await
    }
}

fn parse_category(value: &str) -> ErrorLogRepositoryResult<ErrorCategory> {
    serde_json::from_value(serde_json::Value::String(value.to_owned()))
        .map_err(ErrorLogRepositoryError::persistence)
}

fn row_to_entry(row: ErrorLogRow) -> ErrorLogRepositoryResult<ErrorLogEntry> {
    Ok(ErrorLogEntry::from_persisted(PersistedErrorLogData {
        id: ErrorLogId::from_uuid(row.id),
        occurred_at: row.occurred_at,
        category: parse_category(&row.category)?,
        message: row.message,
        fingerprint: row.fingerprint,
        request_path: row.request_path,
        actor: row.actor_id.map(UserId::from_uuid),
        context: row.context,
    }))
}
