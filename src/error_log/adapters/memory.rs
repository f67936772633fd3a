//! In-memory error log and notifier.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::error_log::{
    domain::{ErrorLogEntry, ErrorNotification},
    ports::{
        ErrorLogRepository, ErrorLogRepositoryError, ErrorLogRepositoryResult, ErrorNotifier,
        NotifyError,
    },
};

/// Thread-safe in-memory error log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryErrorLogRepository {
    entries: Arc<RwLock<Vec<ErrorLogEntry>>>,
}

impl InMemoryErrorLogRepository {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> ErrorLogRepositoryError {
    ErrorLogRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ErrorLogRepository for InMemoryErrorLogRepository {
    async fn record(&self, entry: &ErrorLogEntry) -> ErrorLogRepositoryResult<()> {
        self.entries.write().map_err(lock_error)?.push(entry.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> ErrorLogRepositoryResult<Vec<ErrorLogEntry>> {
        let entries = self.entries.read().map_err(lock_error)?;
        let mut newest_first: Vec<ErrorLogEntry> = entries.iter().rev().cloned().collect();
        newest_first.sort_by(|left, right| right.occurred_at().cmp(&left.occurred_at()));
        newest_first.truncate(limit);
        Ok(newest_first)
    }
}

/// Notifier that keeps every notification it is asked to send.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<ErrorNotification>>>,
}

impl RecordingNotifier {
    /// Creates a notifier with nothing sent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the notifications sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<ErrorNotification> {
        self.sent.read().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ErrorNotifier for RecordingNotifier {
    async fn notify(&self, notification: &ErrorNotification) -> Result<(), NotifyError> {
        self.sent
            .write()
            .map_err(|err| NotifyError(err.to_string()))?
            .push(notification.clone());
        Ok(())
    }
}
