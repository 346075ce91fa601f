use uuid::Uuid;

use crate::{
    audit::log_audit,
    domain::ensure_owner,
    dto::orders::OrderList,
    error::{AppError, AppResult},
    middleware::auth::AuthContext,
    models::{Order, OrderStatus, OrderWithItems},
    repository::{OrderQuery, StatusChange},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    ctx: &AuthContext,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<OrderStatus>().map_err(AppError::Validation)?),
        None => None,
    };

    let (orders, total) = state
        .orders
        .list_by_user(
            ctx.user_id,
            OrderQuery {
                status,
                newest_first: matches!(query.sort_order.unwrap_or(SortOrder::Desc), SortOrder::Desc),
                limit: limit as u64,
                offset: offset as u64,
            },
        )
        .await?;

    let meta = Meta::new(page, limit, total as i64);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    ctx: &AuthContext,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = state
        .orders
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(order.order.user_id, ctx.user_id)?;

    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

/// Buyer-initiated cancellation of a pending order.
pub async fn cancel_order(
    state: &AppState,
    ctx: &AuthContext,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = state
        .orders
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(order.order.user_id, ctx.user_id)?;

    let change = state
        .orders
        .transition_status(id, OrderStatus::Pending, OrderStatus::Canceled)
        .await?;

    let order = match change {
        StatusChange::Applied(order) => {
            tracing::info!(order_id = %id, "order canceled");
            log_audit(
                state.audit.as_ref(),
                Some(ctx.user_id),
                "order_cancel",
                Some("orders"),
                Some(serde_json::json!({ "order_id": id })),
            )
            .await;
            order
        }
        StatusChange::Unchanged(order) if order.status == OrderStatus::Canceled => order,
        StatusChange::Unchanged(order) => {
            return Err(AppError::Validation(format!(
                "order is {} and cannot be canceled",
                order.status
            )));
        }
    };

    Ok(ApiResponse::success("Order canceled", order, Some(Meta::empty())))
}
