//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// Whether the email address has been confirmed out-of-band.
    pub confirmed: bool,
    pub banned: bool,
    /// SHA-256 fingerprint of the last-issued refresh token.
    /// `None` means the account has no live refresh credential.
    pub refresh_fingerprint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    /// Argon2id PHC digest — plaintext never reaches the store.
    pub password_hash: String,
}
