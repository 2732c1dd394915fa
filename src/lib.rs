//! # Passgen (Password Generation & Strength Validation)
//!
//! `passgen` is an HTTP service that produces random passwords from a
//! configurable character policy and scores arbitrary passwords against
//! strength requirements.
//!
//! ## Generation
//!
//! Characters are drawn from four categories (uppercase, lowercase, digits and
//! symbols) using the operating system CSPRNG. Ambiguous look-alikes and
//! caller-supplied characters can be excluded. When `requireEach` is set, one
//! character of every enabled category is seeded before the remainder is
//! filled from the combined pool, and the result is shuffled with an unbiased
//! Fisher-Yates pass so seeded characters do not sit at predictable positions.
//!
//! ## Validation
//!
//! Passwords are scored on a 0-100 scale in 25 point steps and labelled
//! `Very weak`, `Weak`, `Moderate` or `Strong`.
//!
//! ## Persistence
//!
//! Requests and results are logged to `PostgreSQL` (see `sql/schema.sql`).
//! Passwords are hashed with Argon2id before they reach the database and are
//! never written to logs.

pub mod api;
pub mod cli;
pub mod generator;
pub mod store;
pub mod strength;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

/// First seven characters of a commit hash, or the whole value when shorter.
#[must_use]
pub fn short_commit(hash: &str) -> String {
    hash.trim().chars().take(7).collect()
}
