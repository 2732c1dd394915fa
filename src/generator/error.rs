use thiserror::Error;

use super::Category;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("length must be between {min} and {max} characters, got {actual}")]
    InvalidLength { min: usize, max: usize, actual: usize },
    #[error("at least one character category must be enabled")]
    NoCategoriesEnabled,
    #[error("category '{0}' is empty after applying exclusions")]
    CategoryExhausted(Category),
    #[error("count must be between {min} and {max}, got {actual}")]
    InvalidCount { min: usize, max: usize, actual: usize },
    #[error("field '{0}' is required")]
    MissingField(&'static str),
    #[error("secure randomness unavailable: {0}")]
    Entropy(#[from] rand::Error),
}

impl PasswordError {
    /// Input errors are recoverable and caller-visible; everything else is internal.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        !matches!(self, Self::Entropy(_))
    }
}
