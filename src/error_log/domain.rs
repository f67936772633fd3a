//! Error log entries and fingerprints.

use crate::error::ErrorCategory;
use crate::task::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an error log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorLogId(Uuid);

impl ErrorLogId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ErrorLogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorLogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Computes the grouping fingerprint for an error.
///
/// Lowercase hex SHA-256 of `category|request_path|message`; a missing path
/// hashes as the empty string.
#[must_use]
pub fn fingerprint(category: ErrorCategory, request_path: Option<&str>, message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(category.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(request_path.unwrap_or_default().as_bytes());
    hasher.update(b"|");
    hasher.update(message.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Where an error happened and who triggered it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorReportContext {
    /// Request path, e.g. `/api/workshop-tasks/{id}/status`.
    pub request_path: Option<String>,
    /// Authenticated caller, when there was one.
    pub actor: Option<UserId>,
    /// Free-form detail such as the task being changed.
    pub context: serde_json::Value,
}

impl ErrorReportContext {
    /// Creates a context for a request path.
    #[must_use]
    pub fn for_path(request_path: impl Into<String>) -> Self {
        Self {
            request_path: Some(request_path.into()),
            actor: None,
            context: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Sets the caller.
    #[must_use]
    pub const fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Sets the free-form detail.
    #[must_use]
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }
}

/// One recorded error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    id: ErrorLogId,
    occurred_at: DateTime<Utc>,
    category: ErrorCategory,
    message: String,
    fingerprint: String,
    request_path: Option<String>,
    actor: Option<UserId>,
    context: serde_json::Value,
}

/// Parameter object for reconstructing an entry from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedErrorLogData {
    /// Entry identifier.
    pub id: ErrorLogId,
    /// When the error happened.
    pub occurred_at: DateTime<Utc>,
    /// Error category.
    pub category: ErrorCategory,
    /// Error message.
    pub message: String,
    /// Grouping fingerprint.
    pub fingerprint: String,
    /// Request path.
    pub request_path: Option<String>,
    /// Caller.
    pub actor: Option<UserId>,
    /// Free-form detail.
    pub context: serde_json::Value,
}

impl ErrorLogEntry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn new(
        category: ErrorCategory,
        message: impl Into<String>,
        report_context: ErrorReportContext,
        clock: &impl Clock,
    ) -> Self {
        let text = message.into();
        let ErrorReportContext {
            request_path,
            actor,
            context,
        } = report_context;
        Self {
            id: ErrorLogId::new(),
            occurred_at: clock.utc(),
            category,
            fingerprint: fingerprint(category, request_path.as_deref(), &text),
            message: text,
            request_path,
            actor,
            context,
        }
    }

    /// Reconstructs an entry from storage.
    #[must_use]
    pub fn from_persisted(data: PersistedErrorLogData) -> Self {
        Self {
            id: data.id,
            occurred_at: data.occurred_at,
            category: data.category,
            message: data.message,
            fingerprint: data.fingerprint,
            request_path: data.request_path,
            actor: data.actor,
            context: data.context,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> ErrorLogId {
        self.id
    }

    /// Returns when the error happened.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns the category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Returns the request path.
    #[must_use]
    pub fn request_path(&self) -> Option<&str> {
        self.request_path.as_deref()
    }

    /// Returns the caller.
    #[must_use]
    pub const fn actor(&self) -> Option<UserId> {
        self.actor
    }

    /// Returns the free-form detail.
    #[must_use]
    pub const fn context(&self) -> &serde_json::Value {
        &self.context
    }
}

/// Rendered notification handed to an [`ErrorNotifier`](super::ports::ErrorNotifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotification {
    /// Addresses to notify.
    pub recipients: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}
