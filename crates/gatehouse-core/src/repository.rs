//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The auth layer is generic over
//! these traits and never touches a database driver directly.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::GateResult;
use crate::models::user::{CreateUser, User};

/// Persistence seam for user accounts.
///
/// The auth layer reads whole [`User`] records but mutates only the
/// credential fields, the two account flags, and the refresh
/// fingerprint — each through a dedicated operation so the store can
/// enforce them atomically.
pub trait UserRepository: Send + Sync {
    /// Create an account. The very first account in the store is
    /// assigned the `Admin` role; every later account gets `User`.
    /// Fails with `AlreadyExists` if the username or email is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = GateResult<User>> + Send;

    fn get_by_username(&self, username: &str) -> impl Future<Output = GateResult<User>> + Send;

    fn get_by_email(&self, email: &str) -> impl Future<Output = GateResult<User>> + Send;

    /// Mark the account's email as confirmed. Idempotent.
    fn confirm_email(&self, email: &str) -> impl Future<Output = GateResult<User>> + Send;

    /// Replace the email address and reset `confirmed` to false.
    fn update_email(
        &self,
        id: Uuid,
        new_email: &str,
    ) -> impl Future<Output = GateResult<User>> + Send;

    fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> impl Future<Output = GateResult<User>> + Send;

    /// Unconditionally set (or clear) the stored refresh fingerprint.
    fn store_refresh_fingerprint(
        &self,
        id: Uuid,
        fingerprint: Option<String>,
    ) -> impl Future<Output = GateResult<()>> + Send;

    /// Atomically replace the stored refresh fingerprint, but only if
    /// it still equals `expected`. Returns `false` when the stored
    /// value did not match; the caller treats that as a replayed or
    /// stolen token. Must be a single compare-and-swap in the store so
    /// two concurrent rotations cannot both succeed.
    fn swap_refresh_fingerprint(
        &self,
        id: Uuid,
        expected: &str,
        replacement: &str,
    ) -> impl Future<Output = GateResult<bool>> + Send;

    /// Flip the `banned` flag. Fails with `NotFound` for unknown users.
    fn toggle_ban(&self, username: &str) -> impl Future<Output = GateResult<User>> + Send;
}

/// Shared store of tokens revoked before their natural expiry.
///
/// Entries are keyed by token fingerprint; an entry whose `expires_at`
/// has passed is inert (the token itself is already rejected on expiry)
/// and may be garbage-collected at any time.
pub trait RevocationStore: Send + Sync {
    /// Record a token as revoked until `expires_at`. Idempotent.
    fn revoke(
        &self,
        fingerprint: &str,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = GateResult<()>> + Send;

    /// Whether a still-unexpired revocation entry exists.
    fn is_revoked(&self, fingerprint: &str) -> impl Future<Output = GateResult<bool>> + Send;

    /// Remove entries whose `expires_at` has passed. Returns the
    /// number of entries removed.
    fn purge_expired(&self) -> impl Future<Output = GateResult<u64>> + Send;
}
