use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::addresses::{AddressList, CreateAddressRequest},
    error::AppResult,
    middleware::auth::AuthContext,
    models::ShippingAddress,
    response::ApiResponse,
    services::address_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_addresses).post(create_address))
        .route("/{id}", delete(delete_address))
}

#[utoipa::path(
    get,
    path = "/api/addresses",
    responses(
        (status = 200, description = "Shipping addresses of the current user", body = ApiResponse<AddressList>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<ApiResponse<AddressList>>> {
    let resp = address_service::list_addresses(&state, &ctx).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/addresses",
    request_body = CreateAddressRequest,
    responses(
        (status = 200, description = "Address created", body = ApiResponse<ShippingAddress>),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid address"),
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn create_address(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(payload): Json<CreateAddressRequest>,
) -> AppResult<Json<ApiResponse<ShippingAddress>>> {
    let resp = address_service::create_address(&state, &ctx, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Address belongs to another user"),
        (status = 404, description = "Address not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = address_service::delete_address(&state, &ctx, id).await?;
    Ok(Json(resp))
}
