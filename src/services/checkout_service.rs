//! Cart → pending order → gateway session.

use uuid::Uuid;

use crate::{
    audit::log_audit,
    config::AppConfig,
    domain::ensure_owner,
    dto::orders::CheckoutStarted,
    error::{AppError, AppResult},
    middleware::auth::AuthContext,
    models::OrderWithItems,
    payment::{CheckoutSession, CheckoutSessionRequest, SessionLineItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Build the outbound session request for `order`.
///
/// Unit amounts come from the order's price snapshot so the gateway total
/// always equals `total_price_in_cents`.
pub fn session_request(config: &AppConfig, order: &OrderWithItems) -> CheckoutSessionRequest {
    CheckoutSessionRequest {
        order_id: order.order.id,
        currency: config.payment.currency.clone(),
        success_url: config.success_url(),
        cancel_url: config.cancel_url(),
        line_items: order
            .items
            .iter()
            .map(|line| SessionLineItem {
                name: line.variant.display_name(),
                description: line.variant.product_description.clone(),
                image_url: line.variant.image_url.clone(),
                unit_amount: line.item.price_in_cents,
                quantity: line.item.quantity,
            })
            .collect(),
    }
}

/// Snapshot the caller's cart into a pending order and open a payment session.
///
/// The snapshotted lines leave the cart together with the order insert, so a
/// double submit finds an empty cart. Gateway failure deletes the pending
/// order and puts its lines back, so no order exists without a session.
pub async fn start_checkout(
    state: &AppState,
    ctx: &AuthContext,
) -> AppResult<ApiResponse<CheckoutStarted>> {
    let order_id = Uuid::new_v4();
    let mut order = state.orders.place_from_cart(ctx.user_id, order_id).await?;
    tracing::info!(
        order_id = %order_id,
        user_id = %ctx.user_id,
        total = order.order.total_price_in_cents,
        "order placed"
    );

    let request = session_request(&state.config, &order);
    let session = match state.gateway.create_checkout_session(&request).await {
        Ok(session) => session,
        Err(err) => {
            tracing::error!(order_id = %order_id, error = %err, "checkout session failed");
            if let Err(restore_err) = state.orders.return_to_cart(order_id).await {
                tracing::warn!(order_id = %order_id, error = %restore_err, "pending order not returned to cart");
            }
            return Err(AppError::ExternalService(err));
        }
    };

    state
        .orders
        .attach_checkout_session(order_id, &session.id)
        .await?;
    order.order.checkout_session_id = Some(session.id.clone());

    log_audit(
        state.audit.as_ref(),
        Some(ctx.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order_id,
            "session_id": session.id,
            "items": order.items.len(),
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout started",
        CheckoutStarted { order, session },
        Some(Meta::empty()),
    ))
}

/// Open a new payment session for an order that is still pending.
pub async fn create_checkout_session(
    state: &AppState,
    ctx: &AuthContext,
    order_id: Uuid,
) -> AppResult<ApiResponse<CheckoutSession>> {
    let order = state
        .orders
        .find_by_id(order_id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(order.order.user_id, ctx.user_id)?;

    if order.order.status.is_terminal() {
        return Err(AppError::Validation(format!(
            "order is {} and cannot be paid",
            order.order.status
        )));
    }

    let request = session_request(&state.config, &order);
    let session = state
        .gateway
        .create_checkout_session(&request)
        .await
        .inspect_err(|err| {
            tracing::error!(order_id = %order_id, error = %err, "checkout session failed");
        })?;

    state
        .orders
        .attach_checkout_session(order_id, &session.id)
        .await?;

    log_audit(
        state.audit.as_ref(),
        Some(ctx.user_id),
        "checkout_session",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order_id, "session_id": session.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout session created",
        session,
        Some(Meta::empty()),
    ))
}
