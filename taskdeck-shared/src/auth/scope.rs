/// Caller identity and task visibility scoping
///
/// This module is the authorization core of Taskdeck. Every task
/// operation receives a [`Visibility`] derived once per request from the
/// caller's [`AuthContext`], and the store only ever queries within that
/// visibility set.
///
/// # Visibility rule
///
/// - An elevated caller (staff flag set) sees and may act on every task.
/// - A standard caller sees and may act only on tasks they own.
///
/// Record-level misses are indistinguishable between "does not exist" and
/// "owned by someone else": both surface as not-found, so standard
/// callers cannot probe for other users' task ids.
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::scope::{AuthContext, CallerRole, Visibility};
/// use uuid::Uuid;
///
/// let caller = AuthContext {
///     user_id: Uuid::new_v4(),
///     username: "alice".to_string(),
///     email: "a@x.com".to_string(),
///     role: CallerRole::Standard,
/// };
///
/// let visibility = Visibility::for_caller(&caller);
/// assert_eq!(visibility.owner_filter(), Some(caller.user_id));
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::User;

/// Capability level of an authenticated caller
///
/// Resolved exactly once per request from the stored staff flag and
/// threaded explicitly into the scoping logic; handlers never re-query
/// privileges ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerRole {
    /// Regular user: sees only their own tasks
    Standard,

    /// Staff user: unrestricted visibility over all tasks
    Elevated,
}

/// Authenticated caller identity added to request extensions
///
/// Built by the API's auth middleware after validating the access token
/// and re-loading the user row (so the privilege flag is always current
/// and tokens for deleted users stop working).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Username bound to the identity
    pub username: String,

    /// Email address bound to the identity
    pub email: String,

    /// Capability level for this request
    pub role: CallerRole,
}

impl AuthContext {
    /// Builds the caller context from a stored user record
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: if user.is_staff {
                CallerRole::Elevated
            } else {
                CallerRole::Standard
            },
        }
    }
}

/// The subset of task records a caller is permitted to query or mutate
///
/// Applied as a query-time predicate, never as fetch-then-check: a record
/// outside scope is never loaded in the first place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Every task in the store (elevated callers)
    Everything,

    /// Only tasks owned by the given user (standard callers)
    OwnedBy(Uuid),
}

impl Visibility {
    /// Computes the visibility set for a caller
    pub fn for_caller(caller: &AuthContext) -> Self {
        match caller.role {
            CallerRole::Elevated => Visibility::Everything,
            CallerRole::Standard => Visibility::OwnedBy(caller.user_id),
        }
    }

    /// Owner predicate for SQL binding
    ///
    /// `None` means no owner restriction. Queries bind this as
    /// `($n::uuid IS NULL OR owner_id = $n)`.
    pub fn owner_filter(&self) -> Option<Uuid> {
        match self {
            Visibility::Everything => None,
            Visibility::OwnedBy(user_id) => Some(*user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(is_staff: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            username: "test".to_string(),
            password_hash: "$argon2id$...".to_string(),
            is_staff,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_auth_context_from_standard_user() {
        let u = user(false);
        let ctx = AuthContext::from_user(&u);

        assert_eq!(ctx.user_id, u.id);
        assert_eq!(ctx.username, "test");
        assert_eq!(ctx.role, CallerRole::Standard);
    }

    #[test]
    fn test_auth_context_from_staff_user() {
        let u = user(true);
        let ctx = AuthContext::from_user(&u);

        assert_eq!(ctx.role, CallerRole::Elevated);
    }

    #[test]
    fn test_standard_caller_sees_only_own_tasks() {
        let ctx = AuthContext::from_user(&user(false));
        let visibility = Visibility::for_caller(&ctx);

        assert_eq!(visibility, Visibility::OwnedBy(ctx.user_id));
        assert_eq!(visibility.owner_filter(), Some(ctx.user_id));
    }

    #[test]
    fn test_elevated_caller_sees_everything() {
        let ctx = AuthContext::from_user(&user(true));
        let visibility = Visibility::for_caller(&ctx);

        assert_eq!(visibility, Visibility::Everything);
        assert_eq!(visibility.owner_filter(), None);
    }
}
