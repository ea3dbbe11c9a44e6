use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::VerificationError;

/// Checks `plain` against a stored argon2 (PHC) or bcrypt hash.
///
/// Returns `Ok(false)` on mismatch. A hash in neither format fails closed
/// with [`VerificationError::MalformedHash`].
///
/// This is deliberately slow; call it from `spawn_blocking` in async code.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, VerificationError> {
    if is_bcrypt(hash) {
        return bcrypt::verify(plain, hash)
            .map_err(|e| VerificationError::MalformedHash(e.to_string()));
    }

    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| VerificationError::MalformedHash(e.to_string()))?;
    if argon2::Algorithm::try_from(parsed_hash.algorithm).is_err() {
        return Err(VerificationError::MalformedHash(format!(
            "unsupported algorithm: {}",
            parsed_hash.algorithm
        )));
    }

    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hashes `plain` with argon2id and a random salt.
pub fn hash_password(plain: &str) -> Result<String, VerificationError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| VerificationError::Hashing(e.to_string()))?;

    Ok(hash.to_string())
}

/// Burns the same amount of work as a real verification, for usernames the
/// store does not know. Always returns `false`.
pub fn verify_unknown_user(plain: &str) -> bool {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let dummy = DUMMY_HASH.get_or_init(|| hash_password("alertgate-unknown-user").ok());
    if let Some(hash) = dummy {
        let _ = verify_password(plain, hash);
    }
    false
}

fn is_bcrypt(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}
