//! Role-based capability checks.

use gatehouse_core::models::role::Role;
use gatehouse_core::models::user::User;

use crate::error::{AuthError, AuthResult};

/// Require that `user` holds at least the given capability level.
///
/// The single authorization entry point: call sites never compare role
/// discriminants themselves.
pub fn require_role(user: &User, required: Role) -> AuthResult<()> {
    if user.role.satisfies(required) {
        Ok(())
    } else {
        Err(AuthError::InsufficientRole(required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user_with_role(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: String::new(),
            role,
            confirmed: true,
            banned: false,
            refresh_fingerprint: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_passes_every_gate() {
        let admin = user_with_role(Role::Admin);
        assert!(require_role(&admin, Role::Admin).is_ok());
        assert!(require_role(&admin, Role::Moderator).is_ok());
        assert!(require_role(&admin, Role::User).is_ok());
    }

    #[test]
    fn plain_user_is_rejected_at_higher_gates() {
        let user = user_with_role(Role::User);
        assert!(matches!(
            require_role(&user, Role::Admin),
            Err(AuthError::InsufficientRole(Role::Admin))
        ));
        assert!(matches!(
            require_role(&user, Role::Moderator),
            Err(AuthError::InsufficientRole(Role::Moderator))
        ));
        assert!(require_role(&user, Role::User).is_ok());
    }
}
