use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, DecreaseResult, SetShippingAddressRequest},
    error::AppResult,
    middleware::auth::AuthContext,
    models::{Cart, CartItem, CartWithItems},
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/items", post(add_to_cart))
        .route("/items/{id}", delete(remove_from_cart))
        .route("/items/{id}/decrease", post(decrease_cart_item))
        .route("/shipping-address", put(set_shipping_address))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart with lines and selected address; data is null when no cart exists", body = ApiResponse<CartWithItems>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<ApiResponse<Option<CartWithItems>>>> {
    let resp = cart_service::get_cart(&state, &ctx).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Line added or quantity increased", body = ApiResponse<CartItem>),
        (status = 404, description = "Product variant not found"),
        (status = 422, description = "Invalid quantity"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::add_item(&state, &ctx, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items/{id}/decrease",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses(
        (status = 200, description = "One unit removed; the line is deleted at quantity 1", body = ApiResponse<DecreaseResult>),
        (status = 403, description = "Line belongs to another user's cart"),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn decrease_cart_item(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DecreaseResult>>> {
    let resp = cart_service::decrease_item(&state, &ctx, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses(
        (status = 200, description = "OK", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Line belongs to another user's cart"),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::remove_item(&state, &ctx, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/cart/shipping-address",
    request_body = SetShippingAddressRequest,
    responses(
        (status = 200, description = "Shipping address selected", body = ApiResponse<Cart>),
        (status = 403, description = "Address belongs to another user"),
        (status = 404, description = "Address or cart not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn set_shipping_address(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(payload): Json<SetShippingAddressRequest>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let resp = cart_service::set_shipping_address(&state, &ctx, payload.shipping_address_id).await?;
    Ok(Json(resp))
}
