use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{fingerprint, handlers, metrics_middleware, search};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Local files
        .route("/fingerprint", post(fingerprint::fingerprint_file))
        .route("/digest", post(fingerprint::digest_file))
        .route("/payload", post(fingerprint::payload_file))
        // Search
        .route("/plan", post(search::plan_search))
        .route("/rank", post(search::rank_candidates))
        .route("/search", post(search::search));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
