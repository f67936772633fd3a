//! Then steps for task status BDD scenarios.

use super::world::TaskStatusWorld;
use rstest_bdd_macros::then;
use workshop::task::{
    domain::{CompletionValueType, PermissionError, TaskDomainError, TaskStatus},
    services::{TaskLifecycleError, TransitionOutcome},
};

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskStatusWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = world.stored_task()?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            task.status()
        ));
    }
    Ok(())
}

#[then("the task history has {count} entry")]
fn history_has_one_entry(world: &TaskStatusWorld, count: usize) -> Result<(), eyre::Report> {
    history_length_is(world, count)
}

#[then("the task history has {count} entries")]
fn history_has_entries(world: &TaskStatusWorld, count: usize) -> Result<(), eyre::Report> {
    history_length_is(world, count)
}

fn history_length_is(world: &TaskStatusWorld, count: usize) -> Result<(), eyre::Report> {
    let task = world.stored_task()?;
    let actual = task.status_changes().len();
    eyre::ensure!(actual == count, "expected {count} history entries, found {actual}");
    Ok(())
}

#[then(r#"the vehicle's "{field}" is "{value}""#)]
fn maintenance_field_is(
    world: &TaskStatusWorld,
    field: String,
    value: String,
) -> Result<(), eyre::Report> {
    let expected = CompletionValueType::Date
        .parse(&value)
        .ok_or_else(|| eyre::eyre!("invalid expected date in scenario: {value}"))?;
    let stored = world.maintenance.field(world.asset, &field);
    eyre::ensure!(
        stored.as_ref() == Some(&expected),
        "expected {field} = {expected}, found {stored:?}"
    );
    Ok(())
}

#[then("the transition fails with unanswered checklist questions")]
fn fails_with_unanswered_checklist(world: &TaskStatusWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(
        result,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::UnansweredChecklist { .. }
        ))
    ) {
        return Err(eyre::eyre!(
            "expected UnansweredChecklist error, got {result:?}"
        ));
    }
    Ok(())
}

#[then("the transition fails with an invalid status transition error")]
fn fails_with_invalid_transition(world: &TaskStatusWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(
        result,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::InvalidStatusTransition { .. }
        ))
    ) {
        return Err(eyre::eyre!(
            "expected InvalidStatusTransition error, got {result:?}"
        ));
    }
    Ok(())
}

#[then("the transition fails with an invalid status error")]
fn fails_with_invalid_status(world: &TaskStatusWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(result, Err(TaskLifecycleError::InvalidStatus(_))) {
        return Err(eyre::eyre!("expected InvalidStatus error, got {result:?}"));
    }
    Ok(())
}

#[then("the transition is forbidden")]
fn transition_is_forbidden(world: &TaskStatusWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(
        result,
        Err(TaskLifecycleError::Permission(PermissionError::Forbidden { .. }))
    ) {
        return Err(eyre::eyre!("expected Forbidden error, got {result:?}"));
    }
    Ok(())
}

fn last_result(
    world: &TaskStatusWorld,
) -> Result<&Result<TransitionOutcome, TaskLifecycleError>, eyre::Report> {
    world
        .last_transition_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))
}
