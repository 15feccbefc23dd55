//! Password hashing for the credential store.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a plaintext password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns an error if hashing fails (never because of the input value).
pub(super) fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| anyhow!("Password hashing failed: {err}"))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored hash.
///
/// A malformed stored hash verifies as `false` rather than erroring; the
/// underlying comparison is constant-time.
#[must_use]
pub(super) fn verify_password(plain: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_matching_password() -> Result<()> {
        let hash = hash_password("password123")?;
        assert!(verify_password("password123", &hash));
        Ok(())
    }

    #[test]
    fn verify_rejects_wrong_password() -> Result<()> {
        let hash = hash_password("password123")?;
        assert!(!verify_password("password124", &hash));
        Ok(())
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(!verify_password("password123", "not-a-phc-string"));
        assert!(!verify_password("password123", ""));
    }

    #[test]
    fn hashes_are_salted() -> Result<()> {
        let first = hash_password("password123")?;
        let second = hash_password("password123")?;
        assert_ne!(first, second);
        Ok(())
    }
}
