use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tokens", post(handlers::create).get(handlers::list))
        .route("/tokens/otp", post(handlers::otp))
        .route("/tokens/login", post(handlers::login))
        .route("/tokens/consume", post(handlers::consume))
        .route("/tokens/info", post(handlers::info))
        .route("/tokens/expired", delete(handlers::clear))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
