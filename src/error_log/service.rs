//! Recording and notification of internal errors.

use super::{
    domain::{ErrorLogEntry, ErrorNotification, ErrorReportContext},
    ports::{ErrorLogRepository, ErrorNotifier},
};
use crate::config::ErrorReportingConfig;
use crate::error::{Categorize, ErrorCategory};
use chrono::{DateTime, Utc};
use minijinja::Environment;
use mockable::Clock;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, warn};

const SUBJECT_TEMPLATE: &str =
    "[Workshop] {{ category }} error at {{ request_path or \"unknown path\" }}";

const BODY_TEMPLATE: &str = "\
An internal error was recorded.

When: {{ occurred_at }}
Path: {{ request_path or \"n/a\" }}
{% if actor %}User: {{ actor }}
{% endif %}Fingerprint: {{ fingerprint }}

{{ message }}
{% if context %}
Context:
{{ context }}
{% endif %}";

/// Records internal errors and notifies admins.
pub struct ErrorReportingService<R, N, C>
where
    R: ErrorLogRepository,
    N: ErrorNotifier,
    C: Clock + Send + Sync,
{
    log: Arc<R>,
    notifier: Arc<N>,
    clock: Arc<C>,
    config: ErrorReportingConfig,
    last_notified: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl<R, N, C> ErrorReportingService<R, N, C>
where
    R: ErrorLogRepository,
    N: ErrorNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a reporting service.
    #[must_use]
    pub fn new(log: Arc<R>, notifier: Arc<N>, clock: Arc<C>, config: ErrorReportingConfig) -> Self {
        Self {
            log,
            notifier,
            clock,
            config,
            last_notified: Mutex::new(HashMap::new()),
        }
    }

    /// Records `err` when it is an internal error and notifies admins.
    ///
    /// Returns the recorded entry, or `None` for client errors. Storage and
    /// delivery failures are logged and never surface to the caller.
    pub async fn report<E>(&self, err: &E, context: ErrorReportContext) -> Option<ErrorLogEntry>
    where
        E: Categorize + ?Sized,
    {
        let category = err.category();
        if category != ErrorCategory::Internal {
            debug!(%category, "client error not recorded");
            return None;
        }

        let entry = ErrorLogEntry::new(category, err.to_string(), context, &*self.clock);
        error!(
            error_id = %entry.id(),
            fingerprint = entry.fingerprint(),
            path = entry.request_path().unwrap_or_default(),
            message = entry.message(),
            "internal error"
        );
        if let Err(store_err) = self.log.record(&entry).await {
            warn!(error_id = %entry.id(), error = %store_err, "failed to record error log entry");
        }

        if self.should_notify(&entry) {
            self.notify(&entry).await;
        }
        Some(entry)
    }

    /// Claims the notification slot for the entry's fingerprint.
    fn should_notify(&self, entry: &ErrorLogEntry) -> bool {
        if self.config.admin_recipients.is_empty() {
            return false;
        }
        let cooldown = chrono::Duration::from_std(self.config.notify_cooldown())
            .unwrap_or(chrono::Duration::MAX);
        let mut last_notified = self
            .last_notified
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = entry.occurred_at();
        last_notified.retain(|_, sent_at| now.signed_duration_since(*sent_at) < cooldown);
        if last_notified.contains_key(entry.fingerprint()) {
            debug!(fingerprint = entry.fingerprint(), "notification suppressed by cooldown");
            return false;
        }
        last_notified.insert(entry.fingerprint().to_owned(), now);
        true
    }

    #[cfg(test)]
    pub(super) fn tracked_fingerprints(&self) -> usize {
        self.last_notified
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().len(), |map| map.len())
    }

    async fn notify(&self, entry: &ErrorLogEntry) {
        let notification = match self.render(entry) {
            Ok(rendered) => rendered,
            Err(render_err) => {
                warn!(error_id = %entry.id(), error = %render_err, "failed to render error report");
                return;
            }
        };
        if let Err(notify_err) = self.notifier.notify(&notification).await {
            warn!(error_id = %entry.id(), error = %notify_err, "failed to send error report");
        }
    }

    fn render(&self, entry: &ErrorLogEntry) -> Result<ErrorNotification, minijinja::Error> {
        let context_text = match entry.context() {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            other => Some(serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string())),
        };
        let template_context = json!({
            "category": entry.category().as_str(),
            "occurred_at": entry.occurred_at().to_rfc3339(),
            "request_path": entry.request_path(),
            "actor": entry.actor().map(|actor| actor.to_string()),
            "fingerprint": entry.fingerprint(),
            "message": entry.message(),
            "context": context_text,
        });
        let environment = Environment::new();
        Ok(ErrorNotification {
            recipients: self.config.admin_recipients.clone(),
            subject: environment.render_str(SUBJECT_TEMPLATE, &template_context)?,
            body: environment.render_str(BODY_TEMPLATE, &template_context)?,
        })
    }
}
