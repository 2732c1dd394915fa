use super::{
    envelope::ErrorEnvelope,
    params::{json_body, ValidateRequest},
    ApiError, Envelope, SharedRepository,
};
use crate::{
    store::{hash_all, ValidationRecord},
    strength::{self, ValidationResult},
};
use anyhow::Context;
use axum::{body::Bytes, extract::Extension, http::StatusCode, response::Response};
use tracing::{debug, instrument};

#[utoipa::path(
    post,
    path = "/api/password/validate",
    request_body(content = ValidateRequest, content_type = "application/json"),
    responses (
        (status = 200, description = "Password meets the requirements", body = Envelope<ValidationResult>),
        (status = 422, description = "Password does not meet the requirements, or `password` is missing", body = Envelope<ValidationResult>),
        (status = 400, description = "Malformed body", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope),
    ),
    tag = "passwords",
)]
/// Score a password against the requested strength requirements.
#[instrument(skip_all)]
pub async fn validate(
    Extension(repo): Extension<SharedRepository>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: ValidateRequest = json_body(&body)?;
    let (password, requirements) = request.into_parts()?;

    let result = strength::validate(&password, &requirements);
    debug!(
        score = result.score,
        is_valid = result.is_valid,
        "Password validated"
    );

    let password_hash = hash_all(vec![password])
        .await?
        .pop()
        .context("Hashing returned no digest")?;

    let record = ValidationRecord {
        password_hash,
        requirements: serde_json::to_value(&requirements)
            .context("Failed to serialize requirements")?,
        result: result.is_valid,
    };
    repo.log_validation(&record).await?;

    let (status, message) = if result.is_valid {
        (StatusCode::OK, "Password meets the requirements.")
    } else {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Password does not meet the requirements.",
        )
    };

    Ok(Envelope::new(message, result).with_status(status))
}
