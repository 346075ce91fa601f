use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::orders::CheckoutStarted,
    error::AppResult,
    middleware::auth::AuthContext,
    response::ApiResponse,
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(start_checkout))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    responses(
        (status = 200, description = "Pending order created and payment session opened", body = ApiResponse<CheckoutStarted>),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Cart is empty or has no shipping address"),
        (status = 502, description = "Payment gateway unavailable; no order is kept"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn start_checkout(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<ApiResponse<CheckoutStarted>>> {
    let resp = checkout_service::start_checkout(&state, &ctx).await?;
    Ok(Json(resp))
}
