//! Authentication error types.
//!
//! Every expected authentication outcome is its own variant so callers
//! can act on the exact failure; only `Store` is opaque, carrying
//! unexpected faults from the persistence layer.

use gatehouse_core::GateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email address has not been confirmed")]
    EmailNotConfirmed,

    #[error("account is banned")]
    UserBanned,

    #[error("an account with this email or username already exists")]
    DuplicateAccount,

    #[error("malformed token: {0}")]
    TokenMalformed(String),

    #[error("token has expired")]
    TokenExpired,

    #[error("token has been revoked")]
    TokenRevoked,

    #[error("requires at least {0} privileges")]
    InsufficientRole(gatehouse_core::models::role::Role),

    #[error("user not found")]
    UserNotFound,

    #[error("new password is identical to the current one")]
    PasswordUnchanged,

    /// Unexpected store failure; never used for expected outcomes.
    #[error("store error: {0}")]
    Store(#[from] GateError),
}

pub type AuthResult<T> = Result<T, AuthError>;
