pub mod admin;
pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod notice;
pub mod notifications;
pub mod routes;
pub mod services;
pub mod storage;
pub mod templates;

use axum::{
    http::{HeaderValue, Method},
    response::IntoResponse,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use suzstar_common::AppError;

use crate::error::PageError;
use crate::services::AppState;

/// The full application with its middleware stack.
pub fn build_app(state: AppState) -> Router {
    let cors = if state.config.server.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(
            state
                .config
                .server
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
    }
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers(Any);

    routes::create_routes(&state)
        .fallback(handler_404)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn handler_404() -> impl IntoResponse {
    PageError(AppError::NotFound("Page".to_string()))
}
