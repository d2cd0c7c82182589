use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main router: `/healthz` plus the `/api` routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Settings
        .route(
            "/settings",
            get(handlers::read_settings).post(handlers::write_settings),
        )
        // Library sync
        .route("/abs/sync", post(handlers::trigger_sync))
        .route("/abs/status", get(handlers::sync_status))
        .route("/recommendations", get(handlers::recommendations))
        // Logs & feedback
        .route("/logs", get(handlers::read_logs))
        .route("/logs/client", post(handlers::write_client_log))
        .route(
            "/feedback",
            get(handlers::list_feedback).post(handlers::submit_feedback),
        )
        // Tropes
        .route("/tropes/extract", post(handlers::trigger_trope_extraction))
        .route("/tropes/refresh", post(handlers::refresh_tropes))
        .route("/tropes/status", get(handlers::trope_status))
        .route("/discovery/trope-feed", get(handlers::trope_feed))
}

/// CORS for the configured browser origins, credentials allowed
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Wildcards are not allowed together with credentials, so mirror instead.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
