pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::extraction::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction
        .route("/api/v1/questions/extract", post(handlers::handle_extract))
        .route(
            "/api/v1/questions/extract/batch",
            post(handlers::handle_extract_batch),
        )
        .route(
            "/api/v1/questions/extract/pdf",
            post(handlers::handle_extract_pdf),
        )
        .route(
            "/api/v1/questions/extract/url",
            post(handlers::handle_extract_url),
        )
        // Cross-source
        .route(
            "/api/v1/questions/deduplicate",
            post(handlers::handle_deduplicate),
        )
        .route(
            "/api/v1/questions/statistics",
            post(handlers::handle_statistics),
        )
        .route("/api/v1/questions/merge", post(handlers::handle_merge))
        .fallback(not_found)
        .with_state(state)
}
