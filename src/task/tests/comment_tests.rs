//! Unit tests for comment bodies and actor permissions.

use super::fixtures::{actor, vehicle, workshop_actor};
use crate::task::domain::{
    AssetScope, CommentBody, CommentPolicy, PermissionError, PlantId, Role, TaskAsset,
    TaskDomainError, UserId, require_actor,
};
use rstest::rstest;

#[rstest]
#[case("", TaskDomainError::EmptyComment)]
#[case("     ", TaskDomainError::EmptyComment)]
#[case("too short", TaskDomainError::CommentTooShort { min: 10, actual: 9 })]
#[case("  short  ", TaskDomainError::CommentTooShort { min: 10, actual: 5 })]
fn rejects_bodies_outside_default_policy(#[case] raw: &str, #[case] expected: TaskDomainError) {
    assert_eq!(
        CommentBody::new(raw, &CommentPolicy::default()),
        Err(expected)
    );
}

#[rstest]
fn accepts_and_trims_bodies_within_policy() {
    let body = CommentBody::new("  Ordered new brake pads  ", &CommentPolicy::default())
        .expect("valid body");
    assert_eq!(body.as_str(), "Ordered new brake pads");
}

#[rstest]
fn counts_characters_not_bytes() {
    let policy = CommentPolicy {
        min_chars: 10,
        max_chars: 12,
    };
    assert!(CommentBody::new("ééééééééééé", &policy).is_ok());
    assert_eq!(
        CommentBody::new(&"x".repeat(13), &policy),
        Err(TaskDomainError::CommentTooLong {
            max: 12,
            actual: 13
        })
    );
}

#[rstest]
fn default_policy_allows_up_to_1000_characters() {
    let policy = CommentPolicy::default();
    assert!(CommentBody::new(&"a".repeat(1000), &policy).is_ok());
    assert!(matches!(
        CommentBody::new(&"a".repeat(1001), &policy),
        Err(TaskDomainError::CommentTooLong { .. })
    ));
}

#[rstest]
fn missing_caller_is_unauthenticated() {
    assert_eq!(require_actor(None), Err(PermissionError::Unauthenticated));
}

#[rstest]
#[case(Role::Employee, false)]
#[case(Role::Manager, true)]
#[case(Role::Admin, true)]
fn role_decides_workshop_access(#[case] role: Role, #[case] allowed: bool) {
    assert_eq!(
        actor(role).ensure_can_work_on(vehicle(), "change task status").is_ok(),
        allowed
    );
}

#[rstest]
fn workshop_users_are_limited_to_their_scope() {
    let plant = TaskAsset::Plant(PlantId::new());
    let vehicles_only = workshop_actor(AssetScope {
        vehicles: true,
        plant: false,
    });

    assert!(vehicles_only.ensure_can_work_on(vehicle(), "change task status").is_ok());
    assert_eq!(
        vehicles_only.ensure_can_work_on(plant, "change task status"),
        Err(PermissionError::Forbidden {
            user_id: vehicles_only.id(),
            action: "change task status",
        })
    );
    assert!(workshop_actor(AssetScope::default())
        .ensure_can_work_on(vehicle(), "create tasks")
        .is_err());
}

#[rstest]
#[case(Role::Workshop, false)]
#[case(Role::Manager, true)]
#[case(Role::Admin, true)]
fn only_managers_reopen(#[case] role: Role, #[case] allowed: bool) {
    assert_eq!(actor(role).ensure_can_reopen().is_ok(), allowed);
}

#[rstest]
fn authors_and_managers_moderate_comments() {
    let author = actor(Role::Employee);
    let stranger = actor(Role::Workshop);

    assert!(author.ensure_can_moderate(author.id(), "edit this comment").is_ok());
    assert!(actor(Role::Manager)
        .ensure_can_moderate(author.id(), "edit this comment")
        .is_ok());
    assert!(stranger
        .ensure_can_moderate(UserId::new(), "delete this comment")
        .is_err());
}

#[rstest]
#[case("employee", Some(Role::Employee))]
#[case("Workshop", Some(Role::Workshop))]
#[case("admin", Some(Role::Admin))]
#[case("driver", None)]
fn parses_roles(#[case] raw: &str, #[case] expected: Option<Role>) {
    assert_eq!(Role::try_from(raw).ok(), expected);
}
