use super::ApiError;
use axum::{
    extract::Request,
    http::{Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub const ENDPOINTS: [(&str, &str); 3] = [
    ("GET /api/password", "Generate a password."),
    ("POST /api/passwords", "Generate multiple passwords."),
    ("POST /api/password/validate", "Validate the strength of a password."),
];

/// Router fallback: 404 envelope listing the available endpoints.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    route_not_found(&method, uri.path())
}

#[must_use]
pub fn route_not_found(method: &Method, path: &str) -> ApiError {
    let endpoints: serde_json::Map<String, serde_json::Value> = ENDPOINTS
        .iter()
        .map(|(route, description)| ((*route).to_string(), json!(description)))
        .collect();

    ApiError::NotFound {
        message: format!("Route '{path}' [{method}] not found."),
        details: json!({ "available_endpoints": endpoints }),
    }
}

/// Known path with an unsupported method gets the same 404 envelope as an
/// unknown path. An `OPTIONS` that gets past the CORS layer answers 204.
pub async fn method_not_allowed(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    if method == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        route_not_found(&method, &path).into_response()
    }
}
