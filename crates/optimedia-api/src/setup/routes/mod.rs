//! Route configuration and setup.

mod health;

use crate::api_doc::openapi_json;
use crate::auth::middleware::{auth_middleware, AuthState};
use crate::handlers::{image_upload, video_upload, videos};
use crate::middleware::{request_id_middleware, RequestId};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Request},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Assemble the full application router.
///
/// Health probes and the OpenAPI document are public; everything under
/// `/api` that touches media or videos goes through the session gate.
pub fn build_router(
    state: Arc<AppState>,
    auth_state: AuthState,
    cors_origins: &[String],
    max_body_bytes: usize,
) -> Router {
    let cors = setup_cors(cors_origins);

    let protected = protected_routes().layer(axum::middleware::from_fn_with_state(
        Arc::new(auth_state),
        auth_middleware,
    ));

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id,
        )
    });

    public_routes()
        .merge(protected)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

fn setup_cors(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        .route("/api/openapi.json", get(openapi_json))
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/image-upload", post(image_upload::upload_image))
        .route("/api/video-upload", post(video_upload::upload_video))
        .route("/api/all-videos", get(videos::list_videos))
        .route(
            "/api/videos/{id}",
            get(videos::get_video).delete(videos::delete_video),
        )
        .route("/api/videos/{id}/download", get(videos::download_video))
}
