//! In-memory integration tests for error categorisation and reporting.

use std::sync::Arc;

use super::helpers::{Workshop, shop, user};
use eyre::{Result, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use workshop::{
    config::ErrorReportingConfig,
    error::{Categorize, ErrorBody, ErrorCategory},
    error_log::{
        adapters::memory::{InMemoryErrorLogRepository, RecordingNotifier},
        domain::ErrorReportContext,
        ports::ErrorLogRepository,
        service::ErrorReportingService,
    },
    task::{
        domain::{Role, TaskId, TaskStatus},
        ports::TaskRepositoryError,
        services::{TaskLifecycleError, TransitionStatusRequest},
    },
};

type Reporter = ErrorReportingService<InMemoryErrorLogRepository, RecordingNotifier, DefaultClock>;

fn reporter(
    log: &Arc<InMemoryErrorLogRepository>,
    notifier: &Arc<RecordingNotifier>,
) -> Reporter {
    ErrorReportingService::new(
        Arc::clone(log),
        Arc::clone(notifier),
        Arc::new(DefaultClock),
        ErrorReportingConfig {
            admin_recipients: vec!["ops@example.com".to_owned(), "fleet@example.com".to_owned()],
            notify_cooldown_secs: 600,
        },
    )
}

#[rstest]
#[case("bogus", ErrorCategory::Validation, 400)]
#[case("logged", ErrorCategory::NotFound, 404)]
#[tokio::test(flavor = "multi_thread")]
async fn service_failures_become_client_errors(
    shop: Workshop,
    #[case] status: &str,
    #[case] category: ErrorCategory,
    #[case] http_status: u16,
) -> Result<()> {
    let manager = user(Role::Manager, "Alex Planner");
    let err = shop
        .lifecycle
        .transition_status(
            Some(&manager),
            TransitionStatusRequest::new(TaskId::new(), status),
        )
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("transition should fail"))?;

    let body = ErrorBody::from_error(&err);
    assert_eq!(body.category, category);
    assert_eq!(body.status, http_status);
    assert_eq!(body.error, err.to_string());

    let log = Arc::new(InMemoryErrorLogRepository::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let recorded = reporter(&log, &notifier)
        .report(&err, ErrorReportContext::for_path("/api/workshop-tasks/status"))
        .await;
    ensure!(recorded.is_none(), "client errors are not logged");
    ensure!(log.recent(5).await?.is_empty(), "log stays empty");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unauthenticated_calls_map_to_401(shop: Workshop) -> Result<()> {
    let err = shop
        .lifecycle
        .list_by_status(None, TaskStatus::Pending)
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("anonymous listing should fail"))?;
    assert_eq!(err.category(), ErrorCategory::Unauthorized);
    assert_eq!(ErrorBody::from_error(&err).status, 401);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn internal_failures_are_logged_and_sent_to_every_admin() -> Result<()> {
    let log = Arc::new(InMemoryErrorLogRepository::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let reporter = reporter(&log, &notifier);
    let err: TaskLifecycleError =
        TaskRepositoryError::persistence(std::io::Error::other("pool timed out")).into();

    let body = ErrorBody::from_error(&err);
    assert_eq!(body.status, 500);
    assert_eq!(body.error, "internal server error");

    for _ in 0..2 {
        reporter
            .report(&err, ErrorReportContext::for_path("/api/workshop-tasks"))
            .await;
    }

    let entries = log.recent(10).await?;
    ensure!(entries.len() == 2, "each occurrence is logged");
    ensure!(
        entries[0].fingerprint() == entries[1].fingerprint(),
        "repeats share a fingerprint"
    );
    ensure!(entries[0].message().contains("pool timed out"), "message kept");

    let sent = notifier.sent();
    ensure!(sent.len() == 1, "repeat within cooldown is not re-sent");
    assert_eq!(
        sent[0].recipients,
        vec!["ops@example.com".to_owned(), "fleet@example.com".to_owned()]
    );
    assert_eq!(
        sent[0].subject,
        "[Workshop] internal error at /api/workshop-tasks"
    );
    Ok(())
}
