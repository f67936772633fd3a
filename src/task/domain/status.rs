//! Task status workflow and status-history records.

use super::{ActorRef, ParseTaskStatusError, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workshop task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Raised but not yet picked up by the workshop.
    Pending,
    /// Picked up and in progress.
    Logged,
    /// Paused, typically waiting on parts or access to the asset.
    OnHold,
    /// Work finished.
    Completed,
}

impl TaskStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Logged, Self::OnHold, Self::Completed];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Logged => "logged",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` when the workflow permits moving from `self` to `next`.
    ///
    /// Staying in the same status is never a transition. A completed task
    /// can only be reopened to `pending`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Pending,
                Self::Logged | Self::OnHold | Self::Completed
            ) | (
                Self::Logged,
                Self::Pending | Self::OnHold | Self::Completed
            ) | (
                Self::OnHold,
                Self::Pending | Self::Logged | Self::Completed
            ) | (Self::Completed, Self::Pending)
        )
    }

    /// Returns `true` when moving from `self` to `next` reopens finished work.
    #[must_use]
    pub const fn is_reopen(self, next: Self) -> bool {
        matches!((self, next), (Self::Completed, Self::Pending))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "logged" => Ok(Self::Logged),
            "on_hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// One entry of a task's structured status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status entered.
    pub status: TaskStatus,
    /// When the status was entered.
    pub changed_at: DateTime<Utc>,
    /// Who made the change. Absent for entries rebuilt from legacy columns
    /// that never recorded an actor.
    #[serde(default)]
    pub changed_by: Option<ActorRef>,
    /// Optional note recorded with the change.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Scalar status columns kept from before status history existed.
///
/// `logged_*` describe the last move into `logged`; `actioned_*` describe the
/// last completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyStatusColumns {
    /// When the task was logged.
    pub logged_at: Option<DateTime<Utc>>,
    /// Who logged the task.
    pub logged_by: Option<UserId>,
    /// Note recorded when logging.
    pub logged_comment: Option<String>,
    /// When the task was completed.
    pub actioned_at: Option<DateTime<Utc>>,
    /// Who completed the task.
    pub actioned_by: Option<UserId>,
    /// Note recorded on completion.
    pub actioned_comment: Option<String>,
}

impl LegacyStatusColumns {
    /// Rebuilds the two-entry history the legacy columns encode: `logged`
    /// when `logged_at` is set, then `completed` when `actioned_at` is set.
    #[must_use]
    pub fn to_history(&self) -> Vec<StatusChange> {
        let logged = self.logged_at.map(|changed_at| StatusChange {
            status: TaskStatus::Logged,
            changed_at,
            changed_by: self.logged_by.map(ActorRef::anonymous),
            comment: self.logged_comment.clone(),
        });
        let completed = self.actioned_at.map(|changed_at| StatusChange {
            status: TaskStatus::Completed,
            changed_at,
            changed_by: self.actioned_by.map(ActorRef::anonymous),
            comment: self.actioned_comment.clone(),
        });
        logged.into_iter().chain(completed).collect()
    }

    /// Mirrors a new status change into the legacy columns.
    pub(crate) fn record(&mut self, change: &StatusChange) {
        let actor = change.changed_by.as_ref().map(|by| by.user_id);
        match change.status {
            TaskStatus::Logged => {
                self.logged_at = Some(change.changed_at);
                self.logged_by = actor;
                self.logged_comment.clone_from(&change.comment);
            }
            TaskStatus::Completed => {
                self.actioned_at = Some(change.changed_at);
                self.actioned_by = actor;
                self.actioned_comment.clone_from(&change.comment);
            }
            TaskStatus::Pending => {
                self.actioned_at = None;
                self.actioned_by = None;
                self.actioned_comment = None;
            }
            TaskStatus::OnHold => {}
        }
    }
}
