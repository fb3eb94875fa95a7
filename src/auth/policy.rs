//! Authorization rules shared by every mutating service.
//!
//! Owned resources (posts, comments) may be changed by their owner or by an
//! elevated role. Unowned resources (user accounts) only by an elevated role.

use uuid::Uuid;

use crate::database::models::user::{Role, UserView};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

impl Action {
    fn as_str(&self) -> &'static str {
        match self {
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// Anything an authorization decision can be made about
pub trait Resource {
    const KIND: &'static str;

    fn id(&self) -> Uuid;

    /// `None` for resources nobody owns; those are admin-only.
    fn owner_id(&self) -> Option<Uuid>;
}

pub fn can<R: Resource>(user: &UserView, action: Action, resource: &R) -> bool {
    match action {
        Action::Update | Action::Delete => {
            user.role.is_elevated() || resource.owner_id() == Some(user.id)
        }
    }
}

/// `can` as a guard: `Forbidden("Access denied")` when not permitted
pub fn authorize<R: Resource>(user: &UserView, action: Action, resource: &R) -> Result<(), ApiError> {
    if can(user, action, resource) {
        return Ok(());
    }

    tracing::warn!(
        "User {} ({}) denied {} on {} {}",
        user.id,
        user.role,
        action.as_str(),
        R::KIND,
        resource.id()
    );
    Err(ApiError::forbidden("Access denied"))
}

/// Id-only form of `authorize` for callers that hold the owner's id but not
/// the loaded resource
pub fn require_ownership_or_admin(user: &UserView, resource_owner_id: Uuid) -> Result<(), ApiError> {
    struct OwnedBy(Uuid);

    impl Resource for OwnedBy {
        const KIND: &'static str = "resource";

        fn id(&self) -> Uuid {
            self.0
        }

        fn owner_id(&self) -> Option<Uuid> {
            Some(self.0)
        }
    }

    authorize(user, Action::Update, &OwnedBy(resource_owner_id))
}

pub fn require_role(user: &UserView, roles: &[Role]) -> Result<(), ApiError> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin access required"))
    }
}
