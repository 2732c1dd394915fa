use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHasher,
};

/// Hash `plain` with Argon2id and a fresh random salt, returning the PHC string.
///
/// # Errors
/// Returns an error if hashing fails.
pub fn hash_secret(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow!("Argon2 error: {e}"))?;
    Ok(hash.to_string())
}

/// Hash a batch of secrets on the blocking pool.
///
/// # Errors
/// Returns an error if any hash fails or the blocking task panics.
pub async fn hash_all(secrets: Vec<String>) -> Result<Vec<String>> {
    tokio::task::spawn_blocking(move || secrets.iter().map(|s| hash_secret(s)).collect())
        .await
        .context("Hashing task failed")?
}
