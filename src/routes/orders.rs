use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::OrderList,
    error::AppResult,
    middleware::auth::AuthContext,
    models::{Order, OrderWithItems},
    payment::CheckoutSession,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{checkout_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/checkout-session", post(create_checkout_session))
        .route("/{id}/cancel", post(cancel_order))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status: pending, paid, canceled"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Orders of the current user", body = ApiResponse<OrderList>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &ctx, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its snapshot lines", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &ctx, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/checkout-session",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Payment session created", body = ApiResponse<CheckoutSession>),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Order is not pending"),
        (status = 502, description = "Payment gateway unavailable"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CheckoutSession>>> {
    let resp = checkout_service::create_checkout_session(&state, &ctx, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order canceled", body = ApiResponse<Order>),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Order is already paid"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::cancel_order(&state, &ctx, id).await?;
    Ok(Json(resp))
}
