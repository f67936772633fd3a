//! In-memory integration tests for the task workflow.

use super::helpers::{Workshop, servicing, shop, user};
use chrono::NaiveDate;
use eyre::{Result, ensure};
use rstest::rstest;
use workshop::task::{
    domain::{
        CompletionValue, DefectKey, InspectionId, Role, TaskAsset, TaskOrigin, TaskStatus,
        TimelineEntryKind, VehicleId,
    },
    ports::TaskRepository,
    services::{
        CreateManualTaskRequest, DefectReport, SkipReason, SyncDefectsRequest,
        TransitionStatusRequest,
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn defect_task_runs_the_full_workflow(shop: Workshop) -> Result<()> {
    let inspector = user(Role::Employee, "Dana Driver");
    let fitter = user(Role::Workshop, "Sam Fitter");
    let manager = user(Role::Manager, "Alex Planner");
    let inspection_id = InspectionId::new();
    let asset = TaskAsset::Vehicle(VehicleId::new());

    let report = shop
        .lifecycle
        .sync_inspection_defects(
            Some(&inspector),
            SyncDefectsRequest::new(
                inspection_id,
                asset,
                [DefectReport::new("wipers", "Wiper blades").with_comment("Smearing badly")],
            )
            .with_mileage(52_340),
        )
        .await?;
    let task_id = *report
        .created
        .first()
        .ok_or_else(|| eyre::eyre!("defect task should be created"))?;

    for (status, comment) in [
        ("logged", "Booked in for Thursday"),
        ("on_hold", "Waiting on blades from supplier"),
        ("logged", "Blades arrived this morning"),
        ("completed", "Blades replaced and tested"),
    ] {
        shop
            .lifecycle
            .transition_status(
                Some(&fitter),
                TransitionStatusRequest::new(task_id, status).with_comment(comment),
            )
            .await?;
    }
    let reopened = shop
        .lifecycle
        .transition_status(
            Some(&manager),
            TransitionStatusRequest::new(task_id, "pending")
                .with_comment("Driver reports smearing again"),
        )
        .await?;

    let task = reopened.task;
    assert_eq!(task.status(), TaskStatus::Pending);
    assert_eq!(
        task.origin(),
        &TaskOrigin::InspectionDefect {
            inspection_id,
            defect_key: DefectKey::new("wipers")?,
        }
    );
    let statuses: Vec<TaskStatus> = task
        .status_changes()
        .iter()
        .map(|change| change.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            TaskStatus::Logged,
            TaskStatus::OnHold,
            TaskStatus::Logged,
            TaskStatus::Completed,
            TaskStatus::Pending,
        ]
    );
    assert_eq!(
        task.legacy().logged_comment.as_deref(),
        Some("Blades arrived this morning")
    );
    assert_eq!(task.legacy().logged_by, Some(fitter.id()));
    ensure!(task.legacy().actioned_at.is_none(), "reopen clears completion");

    let timeline = shop.lifecycle.timeline(Some(&inspector), task_id).await?;
    ensure!(timeline.len() == 6, "creation plus five status changes");
    assert_eq!(timeline[0].kind, TimelineEntryKind::Created);
    assert_eq!(
        timeline[0].body.as_deref(),
        Some("Wiper blades: Smearing badly")
    );
    ensure!(
        timeline
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp),
        "timeline should be chronological"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resyncing_an_inspection_only_adds_new_defects(shop: Workshop) -> Result<()> {
    let inspector = user(Role::Employee, "Dana Driver");
    let inspection_id = InspectionId::new();
    let asset = TaskAsset::Vehicle(VehicleId::new());

    shop
        .lifecycle
        .sync_inspection_defects(
            Some(&inspector),
            SyncDefectsRequest::new(
                inspection_id,
                asset,
                [DefectReport::new("horn", "Horn inoperative")],
            ),
        )
        .await?;
    let second = shop
        .lifecycle
        .sync_inspection_defects(
            Some(&inspector),
            SyncDefectsRequest::new(
                inspection_id,
                asset,
                [
                    DefectReport::new("horn", "Horn inoperative"),
                    DefectReport::new("mirror", "Mirror glass cracked"),
                ],
            ),
        )
        .await?;

    ensure!(second.created.len() == 1, "only the new defect is created");
    assert_eq!(
        second
            .skipped
            .iter()
            .map(|key| key.as_str())
            .collect::<Vec<_>>(),
        vec!["horn"]
    );
    ensure!(
        shop.tasks.find_by_inspection(inspection_id).await?.len() == 2,
        "one task per defect"
    );
    let other_inspection = shop
        .lifecycle
        .sync_inspection_defects(
            Some(&inspector),
            SyncDefectsRequest::new(
                InspectionId::new(),
                asset,
                [DefectReport::new("horn", "Horn inoperative")],
            ),
        )
        .await?;
    ensure!(
        other_inspection.created.len() == 1,
        "the same defect key on another inspection is a new task"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_applies_subcategory_rules(shop: Workshop) -> Result<()> {
    let manager = user(Role::Manager, "Alex Planner");
    let asset = TaskAsset::Vehicle(VehicleId::new());
    let category = servicing(&shop).await?;
    let task = shop
        .lifecycle
        .create_manual_task(
            Some(&manager),
            CreateManualTaskRequest::new(asset, "Interim service", category).with_mileage(60_000),
        )
        .await?;

    let outcome = shop
        .lifecycle
        .transition_status(
            Some(&manager),
            TransitionStatusRequest::new(task.id(), "completed")
                .with_completion_value("next_service_date", "2027-06-01")
                .with_completion_value("notes", "  Interim service done ")
                .with_completion_value("mot_due_date", "2027-01-15"),
        )
        .await?;

    assert_eq!(outcome.task.status(), TaskStatus::Completed);
    let report = outcome
        .completion
        .ok_or_else(|| eyre::eyre!("completion report expected"))?;
    let applied: Vec<&str> = report
        .applied
        .iter()
        .map(|update| update.field.as_str())
        .collect();
    assert_eq!(applied, vec!["notes", "next_service_date"]);
    ensure!(report.skipped.is_empty(), "every rule had a value");
    ensure!(report.failed.len() == 1, "unknown column write should fail");
    assert_eq!(report.failed[0].field.as_str(), "mot_due_date");

    assert_eq!(
        shop.maintenance.field(asset, "notes"),
        Some(CompletionValue::Text("Interim service done".to_owned()))
    );
    assert_eq!(
        shop.maintenance.field(asset, "next_service_date"),
        NaiveDate::from_ymd_opt(2027, 6, 1).map(CompletionValue::Date)
    );
    let stored = shop.tasks.find_by_id(task.id()).await?;
    assert_eq!(stored.map(|found| found.status()), Some(TaskStatus::Completed));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_without_values_skips_every_rule(shop: Workshop) -> Result<()> {
    let manager = user(Role::Admin, "Root");
    let asset = TaskAsset::Vehicle(VehicleId::new());
    let category = servicing(&shop).await?;
    let task = shop
        .lifecycle
        .create_manual_task(
            Some(&manager),
            CreateManualTaskRequest::new(asset, "Interim service", category),
        )
        .await?;

    let outcome = shop
        .lifecycle
        .transition_status(
            Some(&manager),
            TransitionStatusRequest::new(task.id(), "completed"),
        )
        .await?;

    let report = outcome
        .completion
        .ok_or_else(|| eyre::eyre!("completion report expected"))?;
    ensure!(report.applied.is_empty(), "nothing to write");
    ensure!(
        report
            .skipped
            .iter()
            .all(|skip| skip.reason == SkipReason::NoValue),
        "all rules skipped for lack of a value"
    );
    assert_eq!(report.skipped.len(), 3);
    assert_eq!(shop.maintenance.field(asset, "notes"), None);
    Ok(())
}
