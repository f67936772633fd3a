//! Unit tests for timeline reconstruction.

use super::fixtures::{at, change, comment_at, manual_task, persisted_task, vehicle};
use crate::task::domain::{
    LegacyStatusColumns, TaskId, TaskStatus, TimelineEntryKind, UserId, build_timeline,
};
use rstest::rstest;

fn kinds(entries: &[crate::task::domain::TimelineEntry]) -> Vec<TimelineEntryKind> {
    entries.iter().map(|entry| entry.kind.clone()).collect()
}

#[rstest]
fn creation_event_leads_with_title_and_description() {
    let task = manual_task(vehicle(), None);
    let timeline = build_timeline(&task, &[]);

    assert_eq!(timeline.len(), 1);
    let created = &timeline[0];
    assert_eq!(created.kind, TimelineEntryKind::Created);
    assert_eq!(created.timestamp, task.created_at());
    assert_eq!(created.actor.as_ref(), Some(task.created_by()));
    assert_eq!(
        created.body.as_deref(),
        Some("Replace wiper blades: Driver side smears")
    );
}

#[rstest]
fn creation_body_is_title_alone_without_description() {
    let task = persisted_task(TaskStatus::Pending, Some(vec![]), LegacyStatusColumns::default());
    let timeline = build_timeline(&task, &[]);
    assert_eq!(timeline[0].body.as_deref(), Some("Service due"));
}

#[rstest]
fn entries_are_sorted_by_time_after_creation() {
    let task = persisted_task(
        TaskStatus::Completed,
        Some(vec![
            change(TaskStatus::Logged, at(9, 0)),
            change(TaskStatus::Completed, at(11, 0)),
        ]),
        LegacyStatusColumns::default(),
    );
    let note = comment_at(task.id(), "Waiting on a replacement hose", at(10, 0), at(10, 0));

    let timeline = build_timeline(&task, std::slice::from_ref(&note));

    assert_eq!(
        kinds(&timeline),
        vec![
            TimelineEntryKind::Created,
            TimelineEntryKind::Status {
                status: TaskStatus::Logged
            },
            TimelineEntryKind::Comment {
                comment_id: note.id(),
                edited: false
            },
            TimelineEntryKind::Status {
                status: TaskStatus::Completed
            },
        ]
    );
    assert_eq!(
        timeline[2].body.as_deref(),
        Some("Waiting on a replacement hose")
    );
}

#[rstest]
fn creation_stays_first_even_when_other_entries_predate_it() {
    let task = persisted_task(
        TaskStatus::Logged,
        Some(vec![change(TaskStatus::Logged, at(6, 0))]),
        LegacyStatusColumns::default(),
    );
    let early = comment_at(task.id(), "Imported from the paper log", at(5, 0), at(5, 0));

    let timeline = build_timeline(&task, &[early]);

    assert_eq!(timeline[0].kind, TimelineEntryKind::Created);
    assert_eq!(timeline[1].timestamp, at(5, 0));
    assert_eq!(timeline[2].timestamp, at(6, 0));
}

#[rstest]
fn equal_timestamps_keep_status_before_comment() {
    let task = persisted_task(
        TaskStatus::OnHold,
        Some(vec![change(TaskStatus::OnHold, at(12, 0))]),
        LegacyStatusColumns::default(),
    );
    let first = comment_at(task.id(), "Parts on back order", at(12, 0), at(12, 0));
    let second = comment_at(task.id(), "Supplier says Friday", at(12, 0), at(12, 0));

    let timeline = build_timeline(&task, &[first.clone(), second.clone()]);

    assert_eq!(
        kinds(&timeline)[1..],
        [
            TimelineEntryKind::Status {
                status: TaskStatus::OnHold
            },
            TimelineEntryKind::Comment {
                comment_id: first.id(),
                edited: false
            },
            TimelineEntryKind::Comment {
                comment_id: second.id(),
                edited: false
            },
        ]
    );
}

#[rstest]
fn legacy_columns_feed_the_timeline() {
    let legacy = LegacyStatusColumns {
        logged_at: Some(at(9, 15)),
        logged_by: Some(UserId::new()),
        logged_comment: Some("Booked in".to_owned()),
        ..LegacyStatusColumns::default()
    };
    let task = persisted_task(TaskStatus::Logged, None, legacy);

    let timeline = build_timeline(&task, &[]);

    assert_eq!(timeline.len(), 2);
    assert_eq!(
        timeline[1].kind,
        TimelineEntryKind::Status {
            status: TaskStatus::Logged
        }
    );
    assert_eq!(timeline[1].body.as_deref(), Some("Booked in"));
    assert_eq!(
        timeline[1]
            .actor
            .as_ref()
            .and_then(|actor| actor.display_name.as_deref()),
        None
    );
}

#[rstest]
fn edited_comments_are_flagged_and_foreign_comments_dropped() {
    let task = persisted_task(TaskStatus::Pending, Some(vec![]), LegacyStatusColumns::default());
    let edited = comment_at(task.id(), "Checked tyre pressures", at(9, 0), at(9, 30));
    let foreign = comment_at(TaskId::new(), "Belongs elsewhere", at(9, 5), at(9, 5));

    let timeline = build_timeline(&task, &[edited.clone(), foreign]);

    assert_eq!(timeline.len(), 2);
    assert_eq!(
        timeline[1].kind,
        TimelineEntryKind::Comment {
            comment_id: edited.id(),
            edited: true
        }
    );
}

#[rstest]
fn timeline_serialises_with_type_tag() {
    let task = persisted_task(
        TaskStatus::Logged,
        Some(vec![change(TaskStatus::Logged, at(9, 0))]),
        LegacyStatusColumns::default(),
    );
    let json = serde_json::to_value(build_timeline(&task, &[])).expect("serialises");
    assert_eq!(json[0]["type"], "created");
    assert_eq!(json[1]["type"], "status");
    assert_eq!(json[1]["status"], "logged");
}
