//! Request parameter decoding.
//!
//! Query strings and JSON bodies share one set of field names. Flags accept
//! booleans, integers (`1` is true) and strings (`1`, `true`, `on`, `yes`);
//! integers accept numbers, whole-number floats or numeric strings. Absent and
//! `null` fields take their defaults.
//!
//! Validation requirements are looser: any value other than `false`, `0`,
//! `""`, `"0"`, an empty array or `null` asks for the check.

use super::envelope::ApiError;
use crate::{
    generator::{GenerationOptions, PasswordError, DEFAULT_LENGTH},
    strength::{ValidationRequirements, DEFAULT_MIN_LENGTH},
};
use axum::body::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag(pub bool);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = match RawFlag::deserialize(deserializer)? {
            RawFlag::Bool(value) => value,
            RawFlag::Int(value) => value == 1,
            RawFlag::Float(value) => (value - 1.0).abs() < f64::EPSILON,
            RawFlag::Text(text) => matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            ),
        };
        Ok(Self(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integer(pub i64);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInteger {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match RawInteger::deserialize(deserializer)? {
            RawInteger::Int(value) => Ok(value),
            RawInteger::Float(value) => whole(value).ok_or_else(|| value.to_string()),
            RawInteger::Text(text) => {
                let trimmed = text.trim();
                trimmed
                    .parse()
                    .ok()
                    .or_else(|| trimmed.parse().ok().and_then(whole))
                    .ok_or_else(|| format!("'{text}'"))
            }
        };
        parsed
            .map(Self)
            .map_err(|value| serde::de::Error::custom(format!("{value} is not an integer")))
    }
}

// `16.0` counts as 16; fractional or out of range values do not.
#[allow(clippy::cast_possible_truncation)]
fn whole(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() < 1e15).then(|| value as i64)
}

/// Free text that also takes a bare JSON number, e.g. `"exclude": 123`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(match RawText::deserialize(deserializer)? {
            RawText::Text(text) => text,
            RawText::Number(number) => number.to_string(),
        }))
    }
}

/// Requirement switch: set unless the value is empty or zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truthy(pub bool);

impl<'de> Deserialize<'de> for Truthy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = match Value::deserialize(deserializer)? {
            Value::Null => false,
            Value::Bool(value) => value,
            Value::Number(number) => number.as_f64().is_some_and(|value| value != 0.0),
            Value::String(text) => !(text.is_empty() || text == "0"),
            Value::Array(items) => !items.is_empty(),
            Value::Object(_) => true,
        };
        Ok(Self(value))
    }
}

fn flag(value: Option<Flag>, default: bool) -> bool {
    value.map_or(default, |Flag(value)| value)
}

// Negative values clamp to zero so range checks report them as too small.
fn non_negative(value: Integer) -> usize {
    usize::try_from(value.0).unwrap_or(0)
}

/// Options for the generation endpoints.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GenerateParams {
    /// Password length in characters, 4 to 128 (default 16).
    #[schema(value_type = Option<i64>)]
    #[param(value_type = Option<i64>)]
    pub length: Option<Integer>,
    #[schema(value_type = Option<bool>)]
    #[param(value_type = Option<bool>)]
    pub include_uppercase: Option<Flag>,
    #[schema(value_type = Option<bool>)]
    #[param(value_type = Option<bool>)]
    pub include_lowercase: Option<Flag>,
    #[schema(value_type = Option<bool>)]
    #[param(value_type = Option<bool>)]
    pub include_numbers: Option<Flag>,
    #[schema(value_type = Option<bool>)]
    #[param(value_type = Option<bool>)]
    pub include_symbols: Option<Flag>,
    /// Drop the look-alike characters `Il1O0o`.
    #[schema(value_type = Option<bool>)]
    #[param(value_type = Option<bool>)]
    pub exclude_ambiguous: Option<Flag>,
    /// Characters that must never appear.
    #[schema(value_type = Option<String>)]
    #[param(value_type = Option<String>)]
    pub exclude: Option<Text>,
    /// Guarantee one character from every enabled category (default true).
    #[schema(value_type = Option<bool>)]
    #[param(value_type = Option<bool>)]
    pub require_each: Option<Flag>,
}

impl GenerateParams {
    #[must_use]
    pub fn into_options(self) -> GenerationOptions {
        GenerationOptions {
            length: self.length.map_or(DEFAULT_LENGTH, non_negative),
            include_upper: flag(self.include_uppercase, true),
            include_lower: flag(self.include_lowercase, true),
            include_digits: flag(self.include_numbers, true),
            include_symbols: flag(self.include_symbols, true),
            avoid_ambiguous: flag(self.exclude_ambiguous, false),
            exclude_chars: self.exclude.map(|Text(text)| text).unwrap_or_default(),
            require_each_category: flag(self.require_each, true),
        }
    }
}

/// Body of `POST /api/passwords`: the generation options plus `count`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BulkParams {
    /// Number of passwords, 1 to 100 (default 1).
    #[schema(value_type = Option<i64>)]
    pub count: Option<Integer>,
    #[serde(flatten)]
    pub options: GenerateParams,
}

impl BulkParams {
    #[must_use]
    pub fn into_parts(self) -> (usize, GenerationOptions) {
        (
            self.count.map_or(1, non_negative),
            self.options.into_options(),
        )
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequirementsParams {
    #[schema(value_type = Option<i64>)]
    pub min_length: Option<Integer>,
    #[schema(value_type = Option<bool>)]
    pub require_uppercase: Option<Truthy>,
    #[schema(value_type = Option<bool>)]
    pub require_numbers: Option<Truthy>,
    #[schema(value_type = Option<bool>)]
    pub require_symbols: Option<Truthy>,
}

impl RequirementsParams {
    #[must_use]
    pub fn into_requirements(self) -> ValidationRequirements {
        ValidationRequirements {
            min_length: self.min_length.map_or(DEFAULT_MIN_LENGTH, non_negative),
            require_uppercase: self.require_uppercase.is_some_and(|Truthy(value)| value),
            require_numbers: self.require_numbers.is_some_and(|Truthy(value)| value),
            require_symbols: self.require_symbols.is_some_and(|Truthy(value)| value),
        }
    }
}

/// Body of `POST /api/password/validate`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ValidateRequest {
    pub password: Option<String>,
    pub requirements: Option<RequirementsParams>,
}

impl ValidateRequest {
    /// Split into the password to score and its normalized requirements.
    ///
    /// # Errors
    /// Returns `MissingField` when the password is absent or empty.
    pub fn into_parts(self) -> Result<(String, ValidationRequirements), PasswordError> {
        let password = self
            .password
            .filter(|password| !password.is_empty())
            .ok_or(PasswordError::MissingField("password"))?;
        let requirements = self.requirements.unwrap_or_default().into_requirements();
        Ok((password, requirements))
    }
}

/// Decode a JSON body; an empty body or `null` yields the defaults.
///
/// # Errors
/// Returns `Malformed` when the body is not JSON or does not fit `T`.
pub fn json_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::Malformed("Request body is not valid JSON.".to_string()))?;

    if value.is_null() {
        return Ok(T::default());
    }

    serde_json::from_value(value)
        .map_err(|err| ApiError::Malformed(format!("Invalid request body: {err}.")))
}
