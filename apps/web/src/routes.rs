//! HTTP routes.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers::{generate_question, health, index, submit_answer};
use crate::state::AppState;

/// Create the page router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/question", post(generate_question))
        .route("/answer", post(submit_answer))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
