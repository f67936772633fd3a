//! Callers, roles and the permission rules applied to them.

use super::{AssetKind, ParseValueError, PermissionError, TaskAsset, UserId};
use serde::{Deserialize, Serialize};

/// Application role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Driver or operator. Raises inspections, cannot run the workshop.
    Employee,
    /// Workshop technician, limited to the asset kinds in their scope.
    Workshop,
    /// Fleet or workshop manager.
    Manager,
    /// Administrator.
    Admin,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Workshop => "workshop",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Returns `true` for roles that may moderate other users' records.
    #[must_use]
    pub const fn is_manager(self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "workshop" => Ok(Self::Workshop),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseValueError {
                kind: "role",
                value: value.to_owned(),
            }),
        }
    }
}

/// Asset kinds a workshop user is permitted to work on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetScope {
    /// Fleet vehicles.
    pub vehicles: bool,
    /// Plant.
    pub plant: bool,
}

impl AssetScope {
    /// Scope covering every asset kind.
    pub const ALL: Self = Self {
        vehicles: true,
        plant: true,
    };

    /// Returns `true` when the scope includes `kind`.
    #[must_use]
    pub const fn covers(self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Vehicle => self.vehicles,
            AssetKind::Plant => self.plant,
        }
    }
}

/// Authenticated caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    id: UserId,
    display_name: String,
    role: Role,
    scope: AssetScope,
}

impl Actor {
    /// Creates an actor with an empty asset scope.
    #[must_use]
    pub fn new(id: UserId, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role,
            scope: AssetScope::default(),
        }
    }

    /// Sets the asset scope.
    #[must_use]
    pub const fn with_scope(mut self, scope: AssetScope) -> Self {
        self.scope = scope;
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the asset scope.
    #[must_use]
    pub const fn scope(&self) -> AssetScope {
        self.scope
    }

    /// Returns the snapshot stored on history entries and comments.
    #[must_use]
    pub fn to_ref(&self) -> ActorRef {
        ActorRef {
            user_id: self.id,
            display_name: Some(self.display_name.clone()),
        }
    }

    /// Checks that the actor may run workshop operations on `asset`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Forbidden`] for employees and for workshop
    /// users whose scope excludes the asset kind.
    pub fn ensure_can_work_on(
        &self,
        asset: TaskAsset,
        action: &'static str,
    ) -> Result<(), PermissionError> {
        let allowed = match self.role {
            Role::Employee => false,
            Role::Workshop => self.scope.covers(asset.kind()),
            Role::Manager | Role::Admin => true,
        };
        if allowed {
            Ok(())
        } else {
            Err(self.forbidden(action))
        }
    }

    /// Checks that the actor may reopen completed work.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Forbidden`] unless the actor is a manager
    /// or admin.
    pub fn ensure_can_reopen(&self) -> Result<(), PermissionError> {
        if self.role.is_manager() {
            Ok(())
        } else {
            Err(self.forbidden("reopen a completed task"))
        }
    }

    /// Checks that the actor may edit or delete a record authored by
    /// `author`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Forbidden`] unless the actor is the author
    /// or a manager.
    pub fn ensure_can_moderate(
        &self,
        author: UserId,
        action: &'static str,
    ) -> Result<(), PermissionError> {
        if self.id == author || self.role.is_manager() {
            Ok(())
        } else {
            Err(self.forbidden(action))
        }
    }

    const fn forbidden(&self, action: &'static str) -> PermissionError {
        PermissionError::Forbidden {
            user_id: self.id,
            action,
        }
    }
}

/// Resolves an optional request caller into an authenticated actor.
///
/// # Errors
///
/// Returns [`PermissionError::Unauthenticated`] when `caller` is `None`.
pub const fn require_actor(caller: Option<&Actor>) -> Result<&Actor, PermissionError> {
    match caller {
        Some(actor) => Ok(actor),
        None => Err(PermissionError::Unauthenticated),
    }
}

/// Actor snapshot persisted with history entries, comments and timelines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorRef {
    /// User identifier.
    pub user_id: UserId,
    /// Display name at the time of the action, when known.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl ActorRef {
    /// Creates a reference with a display name.
    #[must_use]
    pub fn named(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: Some(display_name.into()),
        }
    }

    /// Creates a reference for a user whose name was never recorded.
    #[must_use]
    pub const fn anonymous(user_id: UserId) -> Self {
        Self {
            user_id,
            display_name: None,
        }
    }
}
