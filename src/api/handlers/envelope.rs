//! JSON envelopes shared by every endpoint.
//!
//! Success: `{ "success": true, "message": ..., "data": ... }`
//! Failure: `{ "success": false, "error": { "code": ..., "message": ..., "details"?: ... } }`

use crate::generator::PasswordError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    /// Render with an explicit status; a failed validation is still a success envelope.
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body or query could not be decoded.
    #[error("{0}")]
    Malformed(String),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{0:#}")]
    Internal(anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Malformed(_) => StatusCode::BAD_REQUEST,
            Self::Password(PasswordError::MissingField(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Password(err) if err.is_input_error() => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Password(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, details) = match self {
            Self::Malformed(message) => {
                debug!("Malformed request: {message}");
                (message, None)
            }
            Self::Password(err) if err.is_input_error() => {
                debug!("Rejected request: {err}");
                (capitalize(&err.to_string()), None)
            }
            Self::Password(err) => {
                error!("Password generation failed: {err}");
                (INTERNAL_ERROR_MESSAGE.to_string(), None)
            }
            Self::NotFound { message, details } => (message, Some(details)),
            Self::Internal(err) => {
                error!("Failed to handle request: {err:#}");
                (INTERNAL_ERROR_MESSAGE.to_string(), None)
            }
        };

        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: status.as_u16(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Envelope messages are sentences: leading capital, trailing period.
fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        let mut sentence: String = first.to_uppercase().chain(chars).collect();
        if !sentence.ends_with('.') {
            sentence.push('.');
        }
        sentence
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Category;
    use anyhow::anyhow;

    #[test]
    fn input_errors_map_to_client_statuses() {
        let cases = [
            (
                ApiError::Password(PasswordError::InvalidLength {
                    min: 4,
                    max: 128,
                    actual: 3,
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Password(PasswordError::NoCategoriesEnabled),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Password(PasswordError::CategoryExhausted(Category::Digits)),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Password(PasswordError::InvalidCount {
                    min: 1,
                    max: 100,
                    actual: 0,
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Password(PasswordError::MissingField("password")),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::Malformed("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Internal(anyhow!("db down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err:?}");
        }
    }

    #[test]
    fn error_messages_are_sentences() {
        assert_eq!(
            capitalize("field 'password' is required"),
            "Field 'password' is required."
        );
        assert_eq!(capitalize("done."), "Done.");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn details_are_omitted_when_absent() -> Result<(), serde_json::Error> {
        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: 400,
                message: "Bad".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_value(&body)?;
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": {"code": 400, "message": "Bad"}})
        );
        Ok(())
    }

    #[test]
    fn errors_display_their_cause() {
        assert_eq!(
            ApiError::Malformed("Request body is not valid JSON.".to_string()).to_string(),
            "Request body is not valid JSON."
        );
        assert_eq!(
            ApiError::from(PasswordError::NoCategoriesEnabled).to_string(),
            PasswordError::NoCategoriesEnabled.to_string()
        );
        assert_eq!(
            ApiError::from(anyhow!("db down").context("Failed to insert")).to_string(),
            "Failed to insert: db down"
        );

        let converted: anyhow::Error = ApiError::Malformed("bad".to_string()).into();
        assert_eq!(converted.to_string(), "bad");
    }
}
