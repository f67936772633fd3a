//! `PostgreSQL` repository for task comments.

use super::{models::CommentRow, schema::task_comments};
use crate::database::{PgPool, with_connection};
use crate::task::{
    domain::{
        ActorRef, CommentBody, CommentId, PersistedCommentData, TaskComment, TaskId, UserId,
    },
    ports::{CommentRepository, CommentRepositoryError, CommentRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed comment repository.
#[derive(Debug, Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> CommentRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> CommentRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        with_connection(&self.pool, CommentRepositoryError::persistence, f).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn store(&self, comment: &TaskComment) -> CommentRepositoryResult<()> {
        let comment_id = comment.id();
        let row = to_row(comment);
        self.run_blocking(move |connection| {
            diesel::insert_into(task_comments::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        CommentRepositoryError::DuplicateComment(comment_id)
                    }
                    other => CommentRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, comment: &TaskComment) -> CommentRepositoryResult<()> {
        let comment_id = comment.id();
        let body = comment.body().as_str().to_owned();
        let updated_at = comment.updated_at();
        self.run_blocking(move |connection| {
            let affected = diesel::update(task_comments::table.find(comment_id.into_inner()))
                .set((
                    task_comments::body.eq(body),
                    task_comments::updated_at.eq(updated_at),
                ))
                .execute(connection)
                .map_err(CommentRepositoryError::persistence)?;
            if affected == 0 {
                return Err(CommentRepositoryError::NotFound(comment_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: CommentId) -> CommentRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(task_comments::table.find(id.into_inner()))
                .execute(connection)
                .map_err(CommentRepositoryError::persistence)?;
            if affected == 0 {
                return Err(CommentRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: CommentId) -> CommentRepositoryResult<Option<TaskComment>> {
        self.run_blocking(move |connection| {
            let row = task_comments::table
                .find(id.into_inner())
                .select(CommentRow::as_select())
                .first::<CommentRow>(connection)
                .optional()
                .map_err(CommentRepositoryError::persistence)?;
            Ok(row.map(row_to_comment))
        })
        .await
    }

    async fn list_for_task(&self, task_id: TaskId) -> CommentRepositoryResult<Vec<TaskComment>> {
        self.run_blocking(move |connection| {
            let rows = task_comments::table
                .filter(task_comments::task_id.eq(task_id.into_inner()))
                .order((task_comments::created_at.asc(), task_comments::id.asc()))
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)
                .map_err(CommentRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_comment).collect())
        })
        .await
    }
}

fn to_row(comment: &TaskComment) -> CommentRow {
    CommentRow {
        id: comment.id().into_inner(),
        task_id: comment.task_id().into_inner(),
        author_id: comment.author().user_id.into_inner(),
        author_name: comment.author().display_name.clone(),
        body: comment.body().as_str().to_owned(),
        created_at: comment.created_at(),
        updated_at: comment.updated_at(),
    }
}

// Stored bodies were validated on write; limits may have changed since, so
// they are not re-checked here.
fn row_to_comment(row: CommentRow) -> TaskComment {
    TaskComment::from_persisted(PersistedCommentData {
        id: CommentId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        author: ActorRef {
            user_id: UserId::from_uuid(row.author_id),
            display_name: row.author_name,
        },
        body: CommentBody::from_persisted(row.body),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
