use super::{
    envelope::ErrorEnvelope,
    params::{json_body, BulkParams},
    persist_generation, ApiError, Envelope, SharedRepository,
};
use crate::generator;
use axum::{body::Bytes, extract::Extension, http::StatusCode, response::Response};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Debug)]
pub struct GeneratedPasswords {
    pub passwords: Vec<String>,
    pub count: usize,
    pub length: usize,
    pub request_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/passwords",
    request_body(content = BulkParams, content_type = "application/json"),
    responses (
        (status = 201, description = "Passwords generated", body = Envelope<GeneratedPasswords>),
        (status = 400, description = "Malformed body or invalid generation options", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope),
    ),
    tag = "passwords",
)]
/// Generate up to 100 passwords sharing one set of options.
#[instrument(skip_all)]
pub async fn passwords(
    Extension(repo): Extension<SharedRepository>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let params: BulkParams = json_body(&body)?;
    let (count, options) = params.into_parts();

    let passwords = generator::generate_multiple(count, &options)?;
    let request_id = persist_generation(repo.as_ref(), &options, &passwords).await?;

    let data = GeneratedPasswords {
        count: passwords.len(),
        length: options.length,
        passwords,
        request_id,
    };

    Ok(Envelope::new("Passwords generated successfully.", data).with_status(StatusCode::CREATED))
}
