//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Template endpoints live under `/api`; `/healthz` sits at the root for
//! load balancers. Bodies up to [`MAX_BODY_BYTES`] are accepted so render
//! requests can carry base64 image payloads.

pub mod templates;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/templates/{id}", get(templates::get_template).put(templates::save_template))
        .route("/templates/{id}/preview", get(templates::preview))
        .route("/templates/{id}/generate", post(templates::generate))
        .route("/templates/{id}/preview-test", post(templates::preview_test))
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .nest("/api", api_routes())
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
