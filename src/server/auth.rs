//! Password hashing and session tokens.
//!
//! Passwords are hashed as hex SHA-256 of the password plus a fixed pepper so
//! accounts created by earlier deployments keep working.

use rand::Rng;
use sha2::{Digest, Sha256};

const PASSWORD_PEPPER: &str = "activity-tracker-pepper-v1";

/// Sessions stay valid for 30 days.
pub const SESSION_TTL_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Hex-encoded SHA-256 of the peppered password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(PASSWORD_PEPPER.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}

/// Generates a secure random session token.
///
/// Returns 32 random bytes encoded as base64url (no padding).
pub fn generate_session_token() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
