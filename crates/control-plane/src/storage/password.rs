// Password hashing with Argon2id (default parameters)

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Shortest password accepted at sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

/// Returns a user-facing message when the password is unacceptable
pub fn check_password_policy(password: &str) -> Option<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some(format!(
            "Password should be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    None
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("failed to hash password: {e}"))
}

/// A malformed stored hash is an error; a wrong password is `Ok(false)`
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("failed to parse password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("sangeet-2025").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("sangeet-2025", &hash).unwrap());
        assert!(!verify_password("sangeet-2026", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("whatever", "not-a-hash").is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(check_password_policy("12345").is_some());
        assert!(check_password_policy("123456").is_none());
    }
}
