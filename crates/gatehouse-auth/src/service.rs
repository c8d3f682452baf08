//! Authentication service — signup, login, refresh, logout, and
//! account state transitions.

use gatehouse_core::GateError;
use gatehouse_core::models::role::Role;
use gatehouse_core::models::user::{CreateUser, User};
use gatehouse_core::repository::{RevocationStore, UserRepository};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::authorize::require_role;
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::password;
use crate::token::{self, TokenKind};

/// Input for the signup flow.
#[derive(Debug)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Successful signup result.
///
/// The confirmation token is returned for out-of-band delivery; the
/// service itself never sends email.
#[derive(Debug)]
pub struct SignupOutput {
    pub user: User,
    pub confirmation_token: String,
}

/// An access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Successful email-change result.
#[derive(Debug)]
pub struct EmailChangeOutput {
    pub user: User,
    /// Fresh pair issued on the new address.
    pub tokens: TokenPair,
    /// Confirmation token for the new address, delivered out-of-band.
    pub confirmation_token: String,
}

/// Authentication service.
///
/// Generic over the repository traits so the auth layer has no
/// dependency on the database crate. Argon2 work is dispatched to the
/// blocking pool so a slow hash never stalls unrelated requests.
pub struct AuthService<U: UserRepository, R: RevocationStore> {
    users: U,
    revoked: R,
    config: AuthConfig,
}

impl<U: UserRepository, R: RevocationStore> AuthService<U, R> {
    pub fn new(users: U, revoked: R, config: AuthConfig) -> Self {
        Self {
            users,
            revoked,
            config,
        }
    }

    /// Register a new account.
    ///
    /// The account starts unconfirmed; the first account ever created
    /// becomes Admin, all later ones plain User (assigned by the
    /// store).
    pub async fn signup(&self, input: SignupInput) -> AuthResult<SignupOutput> {
        let password_hash = self.hash_blocking(input.password).await?;

        let user = self
            .users
            .create(CreateUser {
                username: input.username,
                email: input.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                GateError::AlreadyExists { .. } => AuthError::DuplicateAccount,
                other => AuthError::Store(other),
            })?;

        let confirmation_token = token::issue(&user.email, TokenKind::EmailConfirm, &self.config)?;

        Ok(SignupOutput {
            user,
            confirmation_token,
        })
    }

    /// Confirm an email address from an out-of-band token.
    ///
    /// An already-confirmed account is a success, not an error.
    pub async fn confirm_email(&self, confirmation_token: &str) -> AuthResult<User> {
        let claims = token::decode(confirmation_token, TokenKind::EmailConfirm, &self.config)?;

        let user = self
            .users
            .get_by_email(&claims.sub)
            .await
            .map_err(|e| not_found_as(e, AuthError::UserNotFound))?;

        if user.confirmed {
            return Ok(user);
        }

        self.users
            .confirm_email(&claims.sub)
            .await
            .map_err(|e| not_found_as(e, AuthError::UserNotFound))
    }

    /// Authenticate with username and password; issue a token pair.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<TokenPair> {
        let user = self
            .users
            .get_by_username(username)
            .await
            .map_err(|e| not_found_as(e, AuthError::InvalidCredentials))?;

        if !user.confirmed {
            return Err(AuthError::EmailNotConfirmed);
        }

        let valid = self
            .verify_blocking(password.to_string(), user.password_hash.clone())
            .await?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        if user.banned {
            return Err(AuthError::UserBanned);
        }

        self.issue_pair(&user.email, user.id).await
    }

    /// Rotate a refresh token: verify it matches the stored
    /// fingerprint, then atomically swap in the fingerprint of a newly
    /// issued refresh token.
    ///
    /// A fingerprint mismatch means the presented token was already
    /// superseded (replay or theft). The stored fingerprint is cleared
    /// so every outstanding refresh token dies and the user must log
    /// in again.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = token::decode(refresh_token, TokenKind::Refresh, &self.config)?;

        let user = self
            .users
            .get_by_email(&claims.sub)
            .await
            .map_err(|e| not_found_as(e, AuthError::UserNotFound))?;

        if user.banned {
            return Err(AuthError::UserBanned);
        }

        let access_token = token::issue(&user.email, TokenKind::Access, &self.config)?;
        let new_refresh = token::issue(&user.email, TokenKind::Refresh, &self.config)?;

        let presented = token::fingerprint(refresh_token);
        let rotated = token::fingerprint(&new_refresh);

        let swapped = self
            .users
            .swap_refresh_fingerprint(user.id, &presented, &rotated)
            .await?;

        if !swapped {
            warn!(user = %user.username, "refresh fingerprint mismatch, forcing re-login");
            self.users.store_refresh_fingerprint(user.id, None).await?;
            return Err(AuthError::TokenRevoked);
        }

        Ok(TokenPair {
            access_token,
            refresh_token: new_refresh,
            token_type: "bearer".into(),
            expires_in: self.config.access_token_ttl_secs,
        })
    }

    /// Revoke an access token until its natural expiry.
    ///
    /// Logging out an invalid or already-expired token is a no-op
    /// success; there is nothing left to revoke.
    pub async fn logout(&self, access_token: &str) -> AuthResult<()> {
        let Ok(claims) = token::decode(access_token, TokenKind::Access, &self.config) else {
            return Ok(());
        };

        self.revoked
            .revoke(&token::fingerprint(access_token), claims.expires_at())
            .await?;
        Ok(())
    }

    /// Validate a bearer access token and return its principal.
    ///
    /// The gate every authenticated request passes through:
    /// decode → revocation check → user lookup → ban check.
    pub async fn authenticate(&self, access_token: &str) -> AuthResult<User> {
        let claims = token::decode(access_token, TokenKind::Access, &self.config)?;

        if self
            .revoked
            .is_revoked(&token::fingerprint(access_token))
            .await?
        {
            return Err(AuthError::TokenRevoked);
        }

        let user = self
            .users
            .get_by_email(&claims.sub)
            .await
            .map_err(|e| not_found_as(e, AuthError::UserNotFound))?;

        if user.banned {
            return Err(AuthError::UserBanned);
        }

        Ok(user)
    }

    /// Issue a fresh confirmation token for an unconfirmed account.
    ///
    /// Returns `None` when the address is already confirmed.
    pub async fn resend_confirmation(&self, email: &str) -> AuthResult<Option<String>> {
        let user = self
            .users
            .get_by_email(email)
            .await
            .map_err(|e| not_found_as(e, AuthError::UserNotFound))?;

        if user.confirmed {
            return Ok(None);
        }

        token::issue(&user.email, TokenKind::EmailConfirm, &self.config).map(Some)
    }

    /// Move the account to a new email address.
    ///
    /// The address reverts to unconfirmed; a confirmation token for
    /// the new address and a fresh token pair on the new subject are
    /// returned.
    pub async fn change_email(&self, user: &User, new_email: &str) -> AuthResult<EmailChangeOutput> {
        match self.users.get_by_email(new_email).await {
            Ok(_) => return Err(AuthError::DuplicateAccount),
            Err(GateError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        let updated = self.users.update_email(user.id, new_email).await?;

        let confirmation_token = token::issue(new_email, TokenKind::EmailConfirm, &self.config)?;
        let tokens = self.issue_pair(new_email, user.id).await?;

        Ok(EmailChangeOutput {
            user: updated,
            tokens,
            confirmation_token,
        })
    }

    /// Replace the account password and issue a fresh token pair.
    ///
    /// Confirmation and ban state are untouched.
    pub async fn change_password(&self, user: &User, new_password: &str) -> AuthResult<TokenPair> {
        let unchanged = self
            .verify_blocking(new_password.to_string(), user.password_hash.clone())
            .await?;
        if unchanged {
            return Err(AuthError::PasswordUnchanged);
        }

        let password_hash = self.hash_blocking(new_password.to_string()).await?;
        self.users.update_password(user.id, &password_hash).await?;

        self.issue_pair(&user.email, user.id).await
    }

    /// Flip the ban flag on the named account. Admin-only.
    pub async fn toggle_ban(&self, caller: &User, username: &str) -> AuthResult<User> {
        require_role(caller, Role::Admin)?;

        self.users
            .toggle_ban(username)
            .await
            .map_err(|e| not_found_as(e, AuthError::UserNotFound))
    }

    /// Drop expired revocation entries. Returns the number removed.
    pub async fn purge_revoked(&self) -> AuthResult<u64> {
        Ok(self.revoked.purge_expired().await?)
    }

    /// Issue a token pair and durably store the refresh fingerprint.
    ///
    /// The fingerprint write is the last fallible step; nothing after
    /// it can turn the result into an error.
    async fn issue_pair(&self, email: &str, user_id: Uuid) -> AuthResult<TokenPair> {
        let access_token = token::issue(email, TokenKind::Access, &self.config)?;
        let refresh_token = token::issue(email, TokenKind::Refresh, &self.config)?;

        self.users
            .store_refresh_fingerprint(user_id, Some(token::fingerprint(&refresh_token)))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "bearer".into(),
            expires_in: self.config.access_token_ttl_secs,
        })
    }

    async fn hash_blocking(&self, password: String) -> AuthResult<String> {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || password::hash_password(&password, &config))
            .await
            .map_err(|e| AuthError::Store(GateError::Internal(format!("hash task failed: {e}"))))?
    }

    async fn verify_blocking(&self, password: String, digest: String) -> AuthResult<bool> {
        let pepper = self.config.pepper.clone();
        tokio::task::spawn_blocking(move || {
            password::verify_password(&password, &digest, pepper.as_deref())
        })
        .await
        .map_err(|e| AuthError::Store(GateError::Internal(format!("verify task failed: {e}"))))
    }
}

fn not_found_as(err: GateError, mapped: AuthError) -> AuthError {
    match err {
        GateError::NotFound { .. } => mapped,
        other => AuthError::Store(other),
    }
}
