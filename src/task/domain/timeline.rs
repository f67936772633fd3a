//! Read-side timeline of a task: creation, status changes and comments.

use super::{ActorRef, CommentId, Task, TaskComment, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a timeline entry records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEntryKind {
    /// The task was raised.
    Created,
    /// The task entered `status`.
    Status {
        /// Status entered.
        status: TaskStatus,
    },
    /// A comment was posted.
    Comment {
        /// Comment identifier.
        comment_id: CommentId,
        /// Whether the comment was edited after posting.
        edited: bool,
    },
}

/// One line of a task timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Entry kind.
    #[serde(flatten)]
    pub kind: TimelineEntryKind,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Who did it, when recorded.
    pub actor: Option<ActorRef>,
    /// Text shown with the entry.
    pub body: Option<String>,
}

/// Merges a task's creation event, status changes and comments into one
/// chronological list.
///
/// The creation event always comes first. Everything else is sorted by
/// timestamp with a stable sort, so ties keep source order: status changes
/// (in history order) before comments (in the order given).
#[must_use]
pub fn build_timeline(task: &Task, comments: &[TaskComment]) -> Vec<TimelineEntry> {
    let created = TimelineEntry {
        kind: TimelineEntryKind::Created,
        timestamp: task.created_at(),
        actor: Some(task.created_by().clone()),
        body: Some(creation_body(task)),
    };

    let status_entries = task
        .status_changes()
        .iter()
        .map(|change| TimelineEntry {
            kind: TimelineEntryKind::Status {
                status: change.status,
            },
            timestamp: change.changed_at,
            actor: change.changed_by.clone(),
            body: change.comment.clone(),
        })
        .collect::<Vec<_>>();

    let comment_entries = comments
        .iter()
        .filter(|comment| comment.task_id() == task.id())
        .map(|comment| TimelineEntry {
            kind: TimelineEntryKind::Comment {
                comment_id: comment.id(),
                edited: comment.is_edited(),
            },
            timestamp: comment.created_at(),
            actor: Some(comment.author().clone()),
            body: Some(comment.body().as_str().to_owned()),
        });

    let mut rest: Vec<TimelineEntry> = status_entries
        .into_iter()
        .chain(comment_entries)
        .collect();
    rest.sort_by_key(|entry| entry.timestamp);

    let mut timeline = Vec::with_capacity(rest.len() + 1);
    timeline.push(created);
    timeline.extend(rest);
    timeline
}

fn creation_body(task: &Task) -> String {
    task.description().map_or_else(
        || task.title().to_string(),
        |description| format!("{}: {description}", task.title()),
    )
}
