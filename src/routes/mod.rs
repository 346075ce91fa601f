use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::get,
};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod addresses;
pub mod cart;
pub mod checkout;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod variants;
pub mod webhooks;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/addresses", addresses::router())
        .nest("/cart", cart::router())
        .nest("/checkout", checkout::router())
        .nest("/orders", orders::router())
        .nest("/variants", variants::router())
        .nest("/webhooks", webhooks::router())
}

/// Full application routes with state bound; transport layers are added by the binary.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
