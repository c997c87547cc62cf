//! Argon2 password digests in PHC string format.
use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;
use till_core::SALT_BYTES;

fn salt() -> Result<SaltString, argon2::password_hash::Error> {
    use rand::Rng;
    let ref mut bytes = [0u8; SALT_BYTES];
    rand::rng().fill(bytes);
    SaltString::encode_b64(bytes)
}

pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    Argon2::default()
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
}

pub fn verify(password: &str, hashword: &str) -> bool {
    PasswordHash::new(hashword)
        .ok()
        .as_ref()
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), hash)
                .is_ok()
        })
        .unwrap_or(false)
}

/// [`hash`] on the blocking pool.
pub async fn hashed(password: String) -> Result<String, super::Error> {
    tokio::task::spawn_blocking(move || hash(&password))
        .await
        .map_err(|e| super::Error::Internal(e.to_string()))?
        .map_err(|e| super::Error::Internal(e.to_string()))
}

/// [`verify`] on the blocking pool. A failed task counts as a mismatch.
pub async fn verified(password: String, hashword: String) -> bool {
    tokio::task::spawn_blocking(move || verify(&password, &hashword))
        .await
        .unwrap_or(false)
}

/// A valid digest of nothing in particular, verified against when the
/// claimed account does not exist so that both paths cost the same.
/// Computed once, on the blocking pool.
pub async fn decoy() -> String {
    static DECOY: tokio::sync::OnceCell<String> = tokio::sync::OnceCell::const_new();
    DECOY
        .get_or_init(|| async {
            tokio::task::spawn_blocking(|| hash("decoy").unwrap_or_default())
                .await
                .unwrap_or_default()
        })
        .await
        .clone()
}
