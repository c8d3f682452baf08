//! Authentication configuration.

use std::env;

/// Configuration for the authentication service.
///
/// Every security-relevant knob lives here; nothing is hard-coded at
/// the call sites. `from_env` reads `GATEHOUSE_*` variables and falls
/// back to the defaults below for anything unset.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret for HMAC-SHA-256 token signing.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime in seconds (default: 604_800 = 7 days).
    pub refresh_token_ttl_secs: i64,
    /// Email-confirmation token lifetime in seconds (default: 86_400 = 24 hours).
    pub email_token_ttl_secs: i64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Argon2id memory cost in KiB (default: 19_456 = 19 MiB).
    pub argon2_memory_kib: u32,
    /// Argon2id iteration count (default: 2).
    pub argon2_iterations: u32,
    /// Argon2id lane count (default: 1).
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl_secs: 900,
            refresh_token_ttl_secs: 604_800,
            email_token_ttl_secs: 86_400,
            pepper: None,
            // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
            argon2_memory_kib: 19_456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl AuthConfig {
    /// Build a configuration from `GATEHOUSE_*` environment variables.
    ///
    /// `GATEHOUSE_JWT_SECRET` is required in any real deployment;
    /// everything else is optional. Unparseable numeric values fall
    /// back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            jwt_secret: env::var("GATEHOUSE_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            access_token_ttl_secs: env_i64(
                "GATEHOUSE_ACCESS_TTL_SECS",
                defaults.access_token_ttl_secs,
            ),
            refresh_token_ttl_secs: env_i64(
                "GATEHOUSE_REFRESH_TTL_SECS",
                defaults.refresh_token_ttl_secs,
            ),
            email_token_ttl_secs: env_i64(
                "GATEHOUSE_EMAIL_TTL_SECS",
                defaults.email_token_ttl_secs,
            ),
            pepper: env::var("GATEHOUSE_PEPPER").ok(),
            argon2_memory_kib: env_u32("GATEHOUSE_ARGON2_MEMORY_KIB", defaults.argon2_memory_kib),
            argon2_iterations: env_u32("GATEHOUSE_ARGON2_ITERATIONS", defaults.argon2_iterations),
            argon2_parallelism: env_u32(
                "GATEHOUSE_ARGON2_PARALLELISM",
                defaults.argon2_parallelism,
            ),
        }
    }

    /// Lifetime in seconds for the given token kind.
    pub fn ttl_secs(&self, kind: crate::token::TokenKind) -> i64 {
        match kind {
            crate::token::TokenKind::Access => self.access_token_ttl_secs,
            crate::token::TokenKind::Refresh => self.refresh_token_ttl_secs,
            crate::token::TokenKind::EmailConfirm => self.email_token_ttl_secs,
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
