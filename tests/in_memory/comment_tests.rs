//! In-memory integration tests for task comments.

use std::sync::Arc;

use super::helpers::{Workshop, servicing, shop, user};
use eyre::{Result, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use workshop::task::{
    adapters::memory::InMemoryCommentRepository,
    domain::{CommentPolicy, PermissionError, Role, TaskAsset, TimelineEntryKind, VehicleId},
    services::{CreateManualTaskRequest, TaskCommentError, TaskCommentService},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edited_comments_are_flagged_on_the_timeline(shop: Workshop) -> Result<()> {
    let manager = user(Role::Manager, "Alex Planner");
    let driver = user(Role::Employee, "Dana Driver");
    let category = servicing(&shop).await?;
    let task = shop
        .lifecycle
        .create_manual_task(
            Some(&manager),
            CreateManualTaskRequest::new(
                TaskAsset::Vehicle(VehicleId::new()),
                "Check tail lift",
                category,
            ),
        )
        .await?;

    let kept = shop
        .comments
        .add_comment(Some(&driver), task.id(), "Tail lift sticks halfway")
        .await?;
    let removed = shop
        .comments
        .add_comment(Some(&driver), task.id(), "Posted on the wrong task")
        .await?;
    shop.comments
        .edit_comment(Some(&driver), kept.id(), "Tail lift sticks when loaded")
        .await?;
    shop.comments
        .delete_comment(Some(&manager), removed.id())
        .await?;

    let timeline = shop.lifecycle.timeline(Some(&driver), task.id()).await?;
    let comments: Vec<_> = timeline
        .iter()
        .filter(|entry| matches!(entry.kind, TimelineEntryKind::Comment { .. }))
        .collect();
    ensure!(comments.len() == 1, "deleted comment should not appear");
    let entry = comments[0];
    assert_eq!(
        entry.kind,
        TimelineEntryKind::Comment {
            comment_id: kept.id(),
            edited: true,
        }
    );
    assert_eq!(entry.body.as_deref(), Some("Tail lift sticks when loaded"));
    assert_eq!(
        entry.actor.as_ref().and_then(|actor| actor.display_name.as_deref()),
        Some("Dana Driver")
    );
    assert_eq!(entry.timestamp, kept.created_at());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn custom_policy_limits_comment_length(shop: Workshop) -> Result<()> {
    let manager = user(Role::Manager, "Alex Planner");
    let category = servicing(&shop).await?;
    let task = shop
        .lifecycle
        .create_manual_task(
            Some(&manager),
            CreateManualTaskRequest::new(
                TaskAsset::Vehicle(VehicleId::new()),
                "Check tail lift",
                category,
            ),
        )
        .await?;
    let comments = TaskCommentService::new(
        Arc::clone(&shop.tasks),
        Arc::new(InMemoryCommentRepository::new()),
        Arc::new(DefaultClock),
    )
    .with_policy(CommentPolicy {
        min_chars: 2,
        max_chars: 20,
    });

    let short = comments.add_comment(Some(&manager), task.id(), "OK").await?;
    let long = comments
        .add_comment(Some(&manager), task.id(), "This note runs well past the limit")
        .await;

    assert_eq!(short.body().as_str(), "OK");
    assert!(matches!(long, Err(TaskCommentError::Domain(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_users_cannot_edit_a_comment(shop: Workshop) -> Result<()> {
    let manager = user(Role::Manager, "Alex Planner");
    let author = user(Role::Workshop, "Sam Fitter");
    let colleague = user(Role::Workshop, "Jo Fitter");
    let category = servicing(&shop).await?;
    let task = shop
        .lifecycle
        .create_manual_task(
            Some(&manager),
            CreateManualTaskRequest::new(
                TaskAsset::Vehicle(VehicleId::new()),
                "Check tail lift",
                category,
            ),
        )
        .await?;
    let comment = shop
        .comments
        .add_comment(Some(&author), task.id(), "Hydraulic fluid low")
        .await?;

    let result = shop
        .comments
        .edit_comment(Some(&colleague), comment.id(), "Hydraulic fluid topped up")
        .await;

    assert!(matches!(
        result,
        Err(TaskCommentError::Permission(PermissionError::Forbidden { user_id, .. }))
            if user_id == colleague.id()
    ));
    let listed = shop.comments.list_comments(Some(&author), task.id()).await?;
    assert_eq!(listed, vec![comment]);
    Ok(())
}
