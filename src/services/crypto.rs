use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand::Rng;

use crate::errors::ApiError;

/// Hash a plaintext password with Argon2id
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal_error(format!("Password hashing error: {}", e)))
}

/// Verify a plaintext password against a stored Argon2 hash
///
/// Returns false for an unparseable hash rather than erroring; a corrupt
/// stored hash must never let a login through.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generate a cryptographically secure random password
///
/// Used when an administrator creates a user without providing a
/// credential: the generated one-time password is returned exactly once
/// in the create response.
///
/// # Returns
/// A 20-character password string containing:
/// - Uppercase letters (A-Z)
/// - Lowercase letters (a-z)
/// - Digits (0-9)
/// - Symbols (!@#$%^&*()_+-=[]{}|;:,.<>?)
pub fn generate_secure_password() -> String {
    const PASSWORD_LENGTH: usize = 20;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                             abcdefghijklmnopqrstuvwxyz\
                             0123456789\
                             !@#$%^&*()_+-=[]{}|;:,.<>?";

    let mut rng = rand::rng();
    let password: String = (0..PASSWORD_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    password
}
