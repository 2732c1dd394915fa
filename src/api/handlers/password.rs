use super::{
    envelope::ErrorEnvelope,
    params::GenerateParams,
    persist_generation, ApiError, Envelope, SharedRepository,
};
use crate::generator;
use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Debug)]
pub struct GeneratedPassword {
    pub password: String,
    /// Length in characters.
    pub length: usize,
    pub request_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/password",
    params(GenerateParams),
    responses (
        (status = 200, description = "Password generated", body = Envelope<GeneratedPassword>),
        (status = 400, description = "Invalid generation options", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope),
    ),
    tag = "passwords",
)]
/// Generate a single password from query-string options.
#[instrument(skip_all)]
pub async fn password(
    Extension(repo): Extension<SharedRepository>,
    query: Result<Query<GenerateParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query.map_err(|err| ApiError::Malformed(err.body_text()))?;
    let options = params.into_options();

    let password = generator::generate(&options)?;
    let request_id = persist_generation(repo.as_ref(), &options, &[password.clone()]).await?;

    let data = GeneratedPassword {
        length: password.chars().count(),
        password,
        request_id,
    };

    Ok(Envelope::new("Password generated successfully.", data).with_status(StatusCode::OK))
}
