//! Persistence of generation and validation logs.
//!
//! Handlers receive the repository as an `Arc<dyn Repository>` extension, so
//! the storage backend is chosen at startup and can be swapped in tests.
//! Only one-way hashes of passwords ever reach a repository.

mod hashing;
mod postgres;

pub use self::hashing::{hash_all, hash_secret};
pub use self::postgres::{PgRepository, SCHEMA_SQL};

use crate::generator::GenerationOptions;
use anyhow::Result;
use serde_json::Value;
use std::{future::Future, pin::Pin};
use uuid::Uuid;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A generated password as stored: PHC hash string plus its rubric score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordRecord {
    pub password_hash: String,
    pub strength_score: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRecord {
    pub password_hash: String,
    pub requirements: Value,
    pub result: bool,
}

pub trait Repository: Send + Sync {
    /// Record a generation request with the hashed passwords it produced and
    /// return the request id. Either every row is stored or none is.
    fn log_generation<'a>(
        &'a self,
        options: &'a GenerationOptions,
        records: &'a [PasswordRecord],
    ) -> BoxFuture<'a, Result<Uuid>>;

    fn log_validation<'a>(&'a self, record: &'a ValidationRecord) -> BoxFuture<'a, Result<()>>;

    /// Check the backend is reachable.
    fn ping(&self) -> BoxFuture<'_, Result<()>>;
}
