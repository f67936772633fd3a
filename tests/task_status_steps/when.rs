//! When steps for task status BDD scenarios.

use super::world::TaskStatusWorld;
use rstest_bdd_macros::when;

#[when(r#"the caller moves the task to "{status}""#)]
fn move_task(world: &mut TaskStatusWorld, status: String) -> Result<(), eyre::Report> {
    world.transition(|request| request, &status)
}

#[when(r#"the caller comments "{comment}" and moves the task to "{status}""#)]
fn move_task_with_comment(
    world: &mut TaskStatusWorld,
    comment: String,
    status: String,
) -> Result<(), eyre::Report> {
    world.transition(|request| request.with_comment(comment), &status)
}

#[when(r#"the caller completes the task with "{field}" set to "{value}""#)]
fn complete_with_value(
    world: &mut TaskStatusWorld,
    field: String,
    value: String,
) -> Result<(), eyre::Report> {
    world.transition(
        |request| request.with_completion_value(field, value),
        "completed",
    )
}

#[when(r#"the caller answers "{key}" with "{answer}" and moves the task to "{status}""#)]
fn answer_and_move(
    world: &mut TaskStatusWorld,
    key: String,
    answer: String,
    status: String,
) -> Result<(), eyre::Report> {
    world.transition(
        |request| request.with_checklist_answer(key, answer),
        &status,
    )
}
