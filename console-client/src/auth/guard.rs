use std::fmt;

use crate::models::{Role, User};

/// Role requirement attached to a guarded page subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any signed-in user may enter.
    Authenticated,
    /// The user's role must match exactly.
    Role(Role),
    /// The user's role must be one of the set. An empty set behaves like
    /// [`RoleRequirement::Authenticated`].
    AnyOf(Vec<Role>),
}

impl fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleRequirement::Authenticated => f.write_str("any authenticated user"),
            RoleRequirement::Role(role) => f.write_str(role.as_str()),
            RoleRequirement::AnyOf(roles) if roles.is_empty() => {
                f.write_str("any authenticated user")
            }
            RoleRequirement::AnyOf(roles) => {
                for (i, role) in roles.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    f.write_str(role.as_str())?;
                }
                Ok(())
            }
        }
    }
}

/// What the shell should render for a guarded subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Render the guarded content.
    Granted,
    /// Nobody is signed in. This is a terminal rendering state for the
    /// subtree, not a redirect.
    AuthenticationRequired,
    /// Signed in but the role does not satisfy the requirement. Carries
    /// both sides so the denial screen can say who may enter.
    Denied {
        required: RoleRequirement,
        actual: Role,
    },
}

/// Gate a page subtree for the current user.
///
/// Purely a UX decision: the backend independently rejects unauthorized
/// requests, so nothing here grants real authority.
pub fn authorize(user: Option<&User>, requirement: &RoleRequirement) -> Access {
    let Some(user) = user else {
        return Access::AuthenticationRequired;
    };

    let allowed = match requirement {
        RoleRequirement::Authenticated => true,
        RoleRequirement::Role(role) => user.role == *role,
        RoleRequirement::AnyOf(roles) => roles.is_empty() || roles.contains(&user.role),
    };

    if allowed {
        Access::Granted
    } else {
        Access::Denied {
            required: requirement.clone(),
            actual: user.role,
        }
    }
}
