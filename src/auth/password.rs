//! Argon2id password hashes stored as PHC strings.

use std::sync::OnceLock;

use anyhow::anyhow;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

fn stored_hash_error(e: password_hash::Error) -> anyhow::Error {
    error!(error = %e, "stored password hash is unreadable");
    anyhow!("parse stored hash: {e}")
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            anyhow!("hash password: {e}")
        })
}

/// Stand-in hash for logins naming an unknown user, so that path costs
/// the same Argon2 run as a wrong password.
fn unknown_user_hash() -> Option<&'static str> {
    static HASH: OnceLock<Option<String>> = OnceLock::new();
    HASH.get_or_init(|| hash_password("unknown-user").ok())
        .as_deref()
}

/// Checks `plain` against the user's stored hash, or against a stand-in
/// when there is no such user. `Err` only when a stored hash is unreadable.
pub fn password_matches(plain: &str, stored: Option<&str>) -> anyhow::Result<bool> {
    let Some(stored) = stored else {
        if let Some(decoy) = unknown_user_hash().and_then(|h| PasswordHash::new(h).ok()) {
            let _ = hasher().verify_password(plain.as_bytes(), &decoy);
        }
        return Ok(false);
    };
    let parsed = PasswordHash::new(stored).map_err(stored_hash_error)?;
    Ok(hasher().verify_password(plain.as_bytes(), &parsed).is_ok())
}
