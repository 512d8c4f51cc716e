//! Route configuration and setup.

mod health;

use crate::handlers::{files::list_files, index::index_page, upload::upload_files};
use crate::middleware::request_id_middleware;
use crate::state::AppState;
use crate::telemetry::http_trace_layer;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use mediadrop_core::{constants::UPLOADS_URL_PREFIX, Config};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Uploaded files are served straight from disk; a missing name is a 404.
    let uploads = ServeDir::new(state.storage.path());

    let app = Router::new()
        .route("/", get(index_page))
        .route("/upload", post(upload_files))
        .route("/files", get(list_files))
        .route("/health", get(health::health_check))
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        // Per-file limits are enforced while streaming each part.
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(http_trace_layer())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    // Wildcard origins are rejected in production by `Config::validate`.
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
