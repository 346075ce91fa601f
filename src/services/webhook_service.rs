//! Reconciles asynchronous gateway events with order status.
//!
//! Deliveries are at-least-once: every transition is a conditional update on
//! the current status, so replays and concurrent duplicates are no-ops. Any
//! storage failure after verification propagates as a 5xx so the gateway
//! re-delivers.

use chrono::Utc;
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::WebhookAck,
    error::{AppError, AppResult},
    models::OrderStatus,
    payment::{EventKind, SignatureError, WebhookEvent, verify_signature},
    repository::StatusChange,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn handle_payment_event(
    state: &AppState,
    signature: Option<&str>,
    payload: &[u8],
) -> AppResult<ApiResponse<WebhookAck>> {
    let signature = signature.ok_or(SignatureError::Missing)?;
    let payment = &state.config.payment;
    verify_signature(
        payload,
        signature,
        payment.webhook_secret.expose_secret(),
        payment.webhook_tolerance_secs,
        Utc::now().timestamp(),
    )
    .inspect_err(|err| tracing::warn!(error = %err, "webhook signature rejected"))?;

    let event = WebhookEvent::from_slice(payload)?;
    let event_id = event.id.as_deref().unwrap_or("-");

    match event.kind() {
        EventKind::CheckoutCompleted => {
            let order_id = event.order_id()?;
            tracing::info!(event_id, order_id = %order_id, "checkout completed event");
            mark_paid(state, order_id).await?;
        }
        EventKind::CheckoutExpired => {
            let order_id = event.order_id()?;
            let session_id = event
                .session()?
                .id
                .ok_or_else(|| AppError::BadRequest("No session id".into()))?;
            tracing::info!(event_id, order_id = %order_id, session_id = %session_id, "checkout expired event");
            cancel_expired(state, order_id, &session_id).await?;
        }
        EventKind::Other => {
            tracing::debug!(event_id, event_type = %event.event_type, "ignoring webhook event");
        }
    }

    Ok(ApiResponse::success(
        "Received",
        WebhookAck { received: true },
        Some(Meta::empty()),
    ))
}

async fn mark_paid(state: &AppState, order_id: Uuid) -> AppResult<()> {
    let change = mark_paid_known_order(state, order_id).await?;

    match &change {
        StatusChange::Applied(order) => {
            tracing::info!(order_id = %order_id, total = order.total_price_in_cents, "order paid");
            log_audit(
                state.audit.as_ref(),
                Some(order.user_id),
                "order_paid",
                Some("orders"),
                Some(serde_json::json!({ "order_id": order_id })),
            )
            .await;
        }
        StatusChange::Unchanged(order) if order.status == OrderStatus::Paid => {
            tracing::debug!(order_id = %order_id, "order already paid");
        }
        StatusChange::Unchanged(order) => {
            tracing::warn!(
                order_id = %order_id,
                status = %order.status,
                "payment confirmed for an order that is no longer pending"
            );
        }
    }
    Ok(())
}

/// Only the order's current session may cancel it; a retry replaces the
/// session, and the superseded one expiring later is a no-op.
async fn cancel_expired(state: &AppState, order_id: Uuid, session_id: &str) -> AppResult<()> {
    let change = match state.orders.expire_session(order_id, session_id).await {
        Err(AppError::NotFound) => {
            return Err(AppError::BadRequest(format!("unknown order {order_id}")));
        }
        other => other?,
    };

    match &change {
        StatusChange::Applied(order) => {
            tracing::info!(order_id = %order_id, "order canceled after session expiry");
            log_audit(
                state.audit.as_ref(),
                Some(order.user_id),
                "order_expired",
                Some("orders"),
                Some(serde_json::json!({ "order_id": order_id, "session_id": session_id })),
            )
            .await;
        }
        StatusChange::Unchanged(order) => {
            tracing::debug!(
                order_id = %order_id,
                status = %order.status,
                current_session = ?order.checkout_session_id,
                "expiry ignored"
            );
        }
    }
    Ok(())
}

/// Pending → paid; an unknown correlation key is the sender's fault.
async fn mark_paid_known_order(state: &AppState, order_id: Uuid) -> AppResult<StatusChange> {
    match state
        .orders
        .transition_status(order_id, OrderStatus::Pending, OrderStatus::Paid)
        .await
    {
        Err(AppError::NotFound) => Err(AppError::BadRequest(format!(
            "unknown order {order_id}"
        ))),
        other => other,
    }
}
