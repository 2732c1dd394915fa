pub mod envelope;
pub mod health;
pub mod not_found;
pub mod params;
pub mod password;
pub mod passwords;
pub mod validate;

pub use self::envelope::{ApiError, Envelope};

// common functions for the handlers
use crate::{
    generator::GenerationOptions,
    store::{hash_all, PasswordRecord, Repository},
    strength::strength_score,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub type SharedRepository = Arc<dyn Repository>;

/// Hash the passwords, then log the request together with one record per password.
///
/// # Errors
/// Returns `Internal` if hashing or the repository call fails.
pub async fn persist_generation(
    repo: &dyn Repository,
    options: &GenerationOptions,
    passwords: &[String],
) -> Result<Uuid, ApiError> {
    let scores: Vec<u8> = passwords.iter().map(|p| strength_score(p)).collect();
    let hashes = hash_all(passwords.to_vec()).await?;

    let records: Vec<PasswordRecord> = hashes
        .into_iter()
        .zip(scores)
        .map(|(password_hash, strength_score)| PasswordRecord {
            password_hash,
            strength_score,
        })
        .collect();

    let request_id = repo.log_generation(options, &records).await?;

    debug!(
        %request_id,
        count = records.len(),
        length = options.length,
        "Stored generated password hashes"
    );

    Ok(request_id)
}
