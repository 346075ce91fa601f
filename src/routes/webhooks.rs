use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};

use crate::{
    dto::orders::WebhookAck,
    error::AppResult,
    payment::SIGNATURE_HEADER,
    response::ApiResponse,
    services::webhook_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/payment", post(payment_webhook))
}

/// Unauthenticated; trust comes from the signature over the raw body.
#[utoipa::path(
    post,
    path = "/api/webhooks/payment",
    security(()),
    request_body(content = String, description = "Raw gateway event JSON", content_type = "application/json"),
    params(
        ("stripe-signature" = String, Header, description = "t=<unix seconds>,v1=<hex HMAC-SHA256>")
    ),
    responses(
        (status = 200, description = "Event accepted", body = ApiResponse<WebhookAck>),
        (status = 400, description = "Bad signature, malformed payload or unknown order"),
        (status = 500, description = "Storage failure; the gateway should retry"),
    ),
    tag = "Webhooks"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<WebhookAck>>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let resp = webhook_service::handle_payment_event(&state, signature, &body).await?;
    Ok(Json(resp))
}
