//! Given steps for task status BDD scenarios.

use super::world::{TaskStatusWorld, caller_with_role, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use workshop::task::{
    domain::{
        ChecklistQuestion, CompletionUpdateRule, CompletionValueType, MaintenanceTarget, Role,
    },
    services::TransitionStatusRequest,
};

#[given(r#"a vehicle task "{title}" in the "{category}" category"#)]
fn vehicle_task(world: &mut TaskStatusWorld, title: String, category: String) {
    world.pending_title = Some(title);
    world.pending_category = Some(category);
}

#[given(r#"the category sets "{field}" as a date on completion"#)]
fn category_sets_date(world: &mut TaskStatusWorld, field: String) -> Result<(), eyre::Report> {
    let label = format!("New {}", field.replace('_', " "));
    let rule = CompletionUpdateRule::new(
        MaintenanceTarget::VehicleMaintenance,
        field,
        CompletionValueType::Date,
        label,
    )?;
    world.pending_rules.push(rule);
    Ok(())
}

#[given(r#"the task has a required checklist question "{key}""#)]
fn required_question(world: &mut TaskStatusWorld, key: String) {
    let prompt = format!("{key}?");
    world
        .pending_questions
        .push(ChecklistQuestion::new(key, prompt, true));
}

#[given(r#"the caller is a "{role}" user"#)]
fn caller_is(world: &mut TaskStatusWorld, role: String) -> Result<(), eyre::Report> {
    let parsed = Role::try_from(role.as_str())
        .map_err(|err| eyre::eyre!("invalid role in scenario: {err}"))?;
    world.caller = Some(caller_with_role(parsed));
    Ok(())
}

#[given("the task has been completed")]
fn task_completed(world: &mut TaskStatusWorld) -> Result<(), eyre::Report> {
    let task = world.ensure_task()?;
    let outcome = run_async(world.service.transition_status(
        Some(&world.manager),
        TransitionStatusRequest::new(task.id(), "completed"),
    ))
    .wrap_err("complete task in scenario setup")?;
    world.task = Some(outcome.task);
    Ok(())
}
