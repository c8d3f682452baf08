//! Password hashing and verification using Argon2id.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::config::AuthConfig;
use crate::error::AuthError;

fn hasher(config: &AuthConfig) -> Result<Argon2<'static>, AuthError> {
    let params = argon2::Params::new(
        config.argon2_memory_kib,
        config.argon2_iterations,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| AuthError::Store(gatehouse_core::GateError::Crypto(format!(
        "argon2 params error: {e}"
    ))))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

fn peppered<'a>(password: &'a str, pepper: Option<&str>, buf: &'a mut String) -> &'a [u8] {
    match pepper {
        Some(p) => {
            buf.push_str(p);
            buf.push_str(password);
            buf.as_bytes()
        }
        None => password.as_bytes(),
    }
}

/// Hash a plaintext password with Argon2id and a random per-hash salt.
///
/// Cost parameters come from the configuration; if a pepper is
/// configured it is prepended to the password before hashing and must
/// match the pepper used during verification.
pub fn hash_password(password: &str, config: &AuthConfig) -> Result<String, AuthError> {
    let mut buf = String::new();
    let input = peppered(password, config.pepper.as_deref(), &mut buf);

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = hasher(config)?
        .hash_password(input, &salt)
        .map_err(|e| {
            AuthError::Store(gatehouse_core::GateError::Crypto(format!(
                "password hash error: {e}"
            )))
        })?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against an Argon2id PHC-format digest.
///
/// Comparison is constant-time. A malformed digest verifies as
/// `false`; this function never fails.
pub fn verify_password(password: &str, digest: &str, pepper: Option<&str>) -> bool {
    let mut buf = String::new();
    let input = peppered(password, pepper, &mut buf);

    let Ok(parsed) = argon2::PasswordHash::new(digest) else {
        return false;
    };

    Argon2::default().verify_password(input, &parsed).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            // Small cost so the suite stays fast.
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            ..AuthConfig::default()
        }
    }

    #[test]
    fn correct_password_matches() {
        let config = test_config();
        let digest = hash_password("hunter2", &config).unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &digest, None));
    }

    #[test]
    fn wrong_password_does_not_match() {
        let config = test_config();
        let digest = hash_password("hunter2", &config).unwrap();
        assert!(!verify_password("wrong", &digest, None));
    }

    #[test]
    fn pepper_is_applied() {
        let config = AuthConfig {
            pepper: Some("pepper!".into()),
            ..test_config()
        };
        let digest = hash_password("hunter2", &config).unwrap();
        assert!(verify_password("hunter2", &digest, Some("pepper!")));
        // Without the pepper verification must fail.
        assert!(!verify_password("hunter2", &digest, None));
    }

    #[test]
    fn malformed_digest_is_false_not_panic() {
        assert!(!verify_password("pw", "not-a-hash", None));
        assert!(!verify_password("pw", "", None));
    }

    #[test]
    fn salts_are_unique() {
        let config = test_config();
        let a = hash_password("same-password", &config).unwrap();
        let b = hash_password("same-password", &config).unwrap();
        assert_ne!(a, b);
    }
}
