//! Signed, time-bounded claim sets: issuance, verification, and
//! fingerprinting.
//!
//! Tokens are HMAC-SHA-256 JWTs signed with the server-held secret.
//! The three kinds (access, refresh, email-confirm) share the wire
//! format and are told apart by the `kind` claim; `decode` takes the
//! expected kind, so a token of one kind is never accepted where
//! another is required.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Discriminator stored in every token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived credential presented on every request.
    Access,
    /// Long-lived credential exchanged for new pairs.
    Refresh,
    /// Out-of-band email-confirmation credential.
    EmailConfirm,
}

/// Claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the account's email address.
    pub sub: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID. Two tokens for the same subject issued within
    /// the same second must still be distinct strings, or rotation
    /// could swap a fingerprint for itself.
    pub jti: String,
    /// Token kind discriminator.
    pub kind: TokenKind,
}

impl Claims {
    /// Expiry as a UTC timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Issue a signed token of the given kind for `subject`.
///
/// The TTL is the configured lifetime for the kind; a non-positive TTL
/// produces a token that is already expired at issuance.
pub fn issue(subject: &str, kind: TokenKind, config: &AuthConfig) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        iat: now,
        exp: now + config.ttl_secs(kind),
        jti: Uuid::new_v4().to_string(),
        kind,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::TokenMalformed(format!("encode: {e}")))
}

/// Verify signature, structure, expiry, and kind; return the claims.
pub fn decode(token: &str, expected: TokenKind, config: &AuthConfig) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    // No leeway: a token expired at issuance is rejected immediately.
    validation.leeway = 0;
    validation.set_required_spec_claims(&["sub", "exp", "iat"]);

    let claims = jsonwebtoken::decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenMalformed(e.to_string()),
        })?;

    if claims.kind != expected {
        return Err(AuthError::TokenMalformed("unexpected token kind".into()));
    }

    Ok(claims)
}

/// SHA-256 fingerprint of a raw token, hex-encoded.
///
/// This is the value persisted by the user store and the revocation
/// store; raw tokens are never written to disk.
pub fn fingerprint(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
