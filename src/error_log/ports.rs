//! Port contracts for error logging and notification.

use super::domain::{ErrorLogEntry, ErrorNotification};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for error log repository operations.
pub type ErrorLogRepositoryResult<T> = Result<T, ErrorLogRepositoryError>;

/// Error log persistence contract.
#[async_trait]
pub trait ErrorLogRepository: Send + Sync {
    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorLogRepositoryError::Persistence`] when storage fails.
    async fn record(&self, entry: &ErrorLogEntry) -> ErrorLogRepositoryResult<()>;

    /// Returns up to `limit` entries, newest first.
    async fn recent(&self, limit: usize) -> ErrorLogRepositoryResult<Vec<ErrorLogEntry>>;
}

/// Errors returned by error log repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ErrorLogRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ErrorLogRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Delivery of rendered error reports, typically by email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ErrorNotifier: Send + Sync {
    /// Sends a notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery fails.
    async fn notify(&self, notification: &ErrorNotification) -> Result<(), NotifyError>;
}

/// Notification delivery failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);
