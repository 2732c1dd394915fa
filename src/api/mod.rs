use crate::store::{PgRepository, Repository};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    middleware,
    routing::{get, options},
    Extension, Json, Router, ServiceExt,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;

pub mod handlers;
mod openapi;

pub use self::openapi::openapi;
use self::handlers::{health, not_found};

const REQUEST_ID: &str = "x-request-id";

/// The router behind trailing-slash trimming, so `/api/password/` routes like `/api/password`.
pub type App = NormalizePath<Router>;

/// Build the application with every route and middleware wired to `repo`.
pub fn app(repo: Arc<dyn Repository>) -> App {
    let (router, doc) = openapi::api_router().split_for_parts();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any);

    let router = router
        .route("/health", options(health::health))
        .route(
            "/openapi.json",
            get(move || {
                let doc = doc.clone();
                async move { Json(doc) }
            }),
        )
        .fallback(not_found::not_found)
        .layer(middleware::from_fn(not_found::method_not_allowed))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(repo)),
        );

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Connect to the database and serve until SIGINT or SIGTERM.
///
/// # Errors
/// Returns an error if the database is unreachable, the schema cannot be
/// applied, or the listener fails.
pub async fn new(port: u16, dsn: &str, max_connections: u32, apply_schema: bool) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(max_connections)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")?;

    let repo = PgRepository::new(pool);
    if apply_schema {
        repo.apply_schema().await?;
    }

    let app = app(Arc::new(repo));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, ServiceExt::<Request<Body>>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let path = request.uri().path();
    let method = request.method().as_str();
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", method, path, request_id)
}
