//! Password strength validation and scoring.
//!
//! Four criteria are worth 25 points each: minimum length, an uppercase
//! letter, a digit and a symbol (anything that is not an ASCII letter or
//! digit). `validate` scores against caller requirements, where a requirement
//! that was not requested always earns its points. `strength_score` is the
//! fixed rubric recorded for freshly generated passwords.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub const DEFAULT_MIN_LENGTH: usize = 8;
pub const CRITERION_POINTS: u8 = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequirements {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_numbers: bool,
    pub require_symbols: bool,
}

impl Default for ValidationRequirements {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            require_uppercase: false,
            require_numbers: false,
            require_symbols: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
pub enum StrengthLabel {
    #[serde(rename = "Very weak")]
    VeryWeak,
    Weak,
    Moderate,
    Strong,
}

impl StrengthLabel {
    /// Tier for a 0-100 score; each lower bound is inclusive.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            100.. => Self::Strong,
            75..=99 => Self::Moderate,
            50..=74 => Self::Weak,
            _ => Self::VeryWeak,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VeryWeak => "Very weak",
            Self::Weak => "Weak",
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub score: u8,
    pub failures: Vec<String>,
    pub strength: StrengthLabel,
}

pub fn has_uppercase(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase())
}

pub fn has_digit(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_digit())
}

pub fn has_symbol(password: &str) -> bool {
    password.chars().any(|c| !c.is_ascii_alphanumeric())
}

/// Score `password` against `requirements`.
///
/// Length is measured in code points. Failures are reported in criterion
/// order: length, uppercase, digit, symbol.
#[must_use]
pub fn validate(password: &str, requirements: &ValidationRequirements) -> ValidationResult {
    let mut failures = Vec::new();
    let mut score = 0;

    let length = password.chars().count();
    if length < requirements.min_length {
        failures.push(format!(
            "Minimum length of {} not reached (has {length}).",
            requirements.min_length
        ));
    } else {
        score += CRITERION_POINTS;
    }

    let optional = [
        (
            requirements.require_uppercase,
            has_uppercase(password),
            "Must contain at least one uppercase letter.",
        ),
        (
            requirements.require_numbers,
            has_digit(password),
            "Must contain at least one number.",
        ),
        (
            requirements.require_symbols,
            has_symbol(password),
            "Must contain at least one symbol.",
        ),
    ];

    for (required, satisfied, failure) in optional {
        if required && !satisfied {
            failures.push(failure.to_string());
        } else {
            score += CRITERION_POINTS;
        }
    }

    ValidationResult {
        is_valid: failures.is_empty(),
        score,
        failures,
        strength: StrengthLabel::from_score(score),
    }
}

/// Fixed rubric used when recording generated passwords.
#[must_use]
pub fn strength_score(password: &str) -> u8 {
    let criteria = [
        password.chars().count() >= DEFAULT_MIN_LENGTH,
        has_uppercase(password),
        has_digit(password),
        has_symbol(password),
    ];

    criteria
        .into_iter()
        .filter(|met| *met)
        .map(|_| CRITERION_POINTS)
        .sum()
}
