mod common;

use chrono::Utc;
use common::{TestApp, WEBHOOK_SECRET, session_event, session_event_for, sign, user};
use storefront_checkout::{
    error::AppError,
    models::OrderStatus,
    payment::{SignatureError, sign_payload},
    services::{checkout_service, webhook_service},
};
use uuid::Uuid;

async fn pending_order(app: &TestApp) -> Uuid {
    let ctx = user();
    app.ready_cart(&ctx).await;
    checkout_service::start_checkout(&app.state, &ctx)
        .await
        .expect("checkout")
        .data
        .expect("checkout data")
        .order
        .order
        .id
}

async fn current_session(app: &TestApp, order_id: Uuid) -> String {
    app.state
        .orders
        .find_by_id(order_id)
        .await
        .expect("lookup")
        .expect("order exists")
        .order
        .checkout_session_id
        .expect("session attached")
}

async fn status_of(app: &TestApp, order_id: Uuid) -> OrderStatus {
    app.state
        .orders
        .find_by_id(order_id)
        .await
        .expect("lookup")
        .expect("order exists")
        .order
        .status
}

#[tokio::test]
async fn completed_event_marks_order_paid_once() {
    let app = TestApp::new();
    let order_id = pending_order(&app).await;
    let payload = session_event("checkout.session.completed", Some(&order_id.to_string()));
    let signature = sign(&payload);

    let ack = webhook_service::handle_payment_event(&app.state, Some(&signature), &payload)
        .await
        .expect("first delivery");
    assert!(ack.data.expect("ack").received);

    let order = app.state.orders.find_by_id(order_id).await.unwrap().unwrap().order;
    assert_eq!(order.status, OrderStatus::Paid);
    let paid_at = order.paid_at.expect("paid_at set");

    webhook_service::handle_payment_event(&app.state, Some(&signature), &payload)
        .await
        .expect("replayed delivery");
    let order = app.state.orders.find_by_id(order_id).await.unwrap().unwrap().order;
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.paid_at, Some(paid_at));

    let paid_audits = app
        .store
        .audit_entries()
        .await
        .into_iter()
        .filter(|entry| entry.action == "order_paid")
        .count();
    assert_eq!(paid_audits, 1);
}

#[tokio::test]
async fn concurrent_duplicates_apply_once() {
    let app = TestApp::new();
    let order_id = pending_order(&app).await;
    let payload = session_event("checkout.session.completed", Some(&order_id.to_string()));
    let signature = sign(&payload);

    let (a, b) = tokio::join!(
        webhook_service::handle_payment_event(&app.state, Some(&signature), &payload),
        webhook_service::handle_payment_event(&app.state, Some(&signature), &payload),
    );
    a.expect("first");
    b.expect("second");

    assert_eq!(status_of(&app, order_id).await, OrderStatus::Paid);
    let paid_audits = app
        .store
        .audit_entries()
        .await
        .into_iter()
        .filter(|entry| entry.action == "order_paid")
        .count();
    assert_eq!(paid_audits, 1);
}

#[tokio::test]
async fn bad_signatures_leave_order_untouched() {
    let app = TestApp::new();
    let order_id = pending_order(&app).await;
    let payload = session_event("checkout.session.completed", Some(&order_id.to_string()));

    let err = webhook_service::handle_payment_event(&app.state, None, &payload)
        .await
        .expect_err("missing header");
    assert!(matches!(err, AppError::Signature(SignatureError::Missing)));

    let wrong_key = sign_payload(&payload, "whsec_other", Utc::now().timestamp());
    let err = webhook_service::handle_payment_event(&app.state, Some(&wrong_key), &payload)
        .await
        .expect_err("wrong secret");
    assert!(matches!(err, AppError::Signature(SignatureError::Mismatch)));

    let stale = sign_payload(&payload, WEBHOOK_SECRET, Utc::now().timestamp() - 3600);
    let err = webhook_service::handle_payment_event(&app.state, Some(&stale), &payload)
        .await
        .expect_err("stale timestamp");
    assert!(matches!(err, AppError::Signature(SignatureError::Expired)));

    let signature = sign(&payload);
    let mut tampered = payload.clone();
    tampered.extend_from_slice(b" ");
    let err = webhook_service::handle_payment_event(&app.state, Some(&signature), &tampered)
        .await
        .expect_err("tampered body");
    assert!(matches!(err, AppError::Signature(SignatureError::Mismatch)));

    assert_eq!(status_of(&app, order_id).await, OrderStatus::Pending);
}

#[tokio::test]
async fn missing_or_unknown_order_id_is_bad_request() {
    let app = TestApp::new();
    let order_id = pending_order(&app).await;

    let payload = session_event("checkout.session.completed", None);
    let err = webhook_service::handle_payment_event(&app.state, Some(&sign(&payload)), &payload)
        .await
        .expect_err("no orderId");
    assert!(matches!(err, AppError::BadRequest(_)));

    let payload = session_event("checkout.session.completed", Some(&Uuid::new_v4().to_string()));
    let err = webhook_service::handle_payment_event(&app.state, Some(&sign(&payload)), &payload)
        .await
        .expect_err("unknown order");
    assert!(matches!(err, AppError::BadRequest(_)));

    let payload = session_event("checkout.session.completed", Some("not-a-uuid"));
    let err = webhook_service::handle_payment_event(&app.state, Some(&sign(&payload)), &payload)
        .await
        .expect_err("malformed orderId");
    assert!(matches!(err, AppError::BadRequest(_)));

    assert_eq!(status_of(&app, order_id).await, OrderStatus::Pending);
}

#[tokio::test]
async fn unrelated_events_are_acknowledged_without_changes() {
    let app = TestApp::new();
    let order_id = pending_order(&app).await;
    let payload = session_event("payment_intent.created", Some(&order_id.to_string()));

    let ack = webhook_service::handle_payment_event(&app.state, Some(&sign(&payload)), &payload)
        .await
        .expect("ignored event");
    assert!(ack.data.expect("ack").received);
    assert_eq!(status_of(&app, order_id).await, OrderStatus::Pending);
}

#[tokio::test]
async fn expired_session_cancels_pending_order_but_not_paid_one() {
    let app = TestApp::new();
    let pending = pending_order(&app).await;
    let session = current_session(&app, pending).await;
    let payload = session_event_for("checkout.session.expired", &session, Some(&pending.to_string()));
    webhook_service::handle_payment_event(&app.state, Some(&sign(&payload)), &payload)
        .await
        .expect("expire");
    assert_eq!(status_of(&app, pending).await, OrderStatus::Canceled);

    let paid = pending_order(&app).await;
    let completed = session_event("checkout.session.completed", Some(&paid.to_string()));
    webhook_service::handle_payment_event(&app.state, Some(&sign(&completed)), &completed)
        .await
        .expect("pay");
    let session = current_session(&app, paid).await;
    let expired = session_event_for("checkout.session.expired", &session, Some(&paid.to_string()));
    webhook_service::handle_payment_event(&app.state, Some(&sign(&expired)), &expired)
        .await
        .expect("late expiry");
    assert_eq!(status_of(&app, paid).await, OrderStatus::Paid);
}

#[tokio::test]
async fn payment_for_canceled_order_is_acknowledged_and_ignored() {
    let app = TestApp::new();
    let order_id = pending_order(&app).await;
    let session = current_session(&app, order_id).await;
    let expired = session_event_for("checkout.session.expired", &session, Some(&order_id.to_string()));
    webhook_service::handle_payment_event(&app.state, Some(&sign(&expired)), &expired)
        .await
        .expect("expire");

    let completed = session_event("checkout.session.completed", Some(&order_id.to_string()));
    webhook_service::handle_payment_event(&app.state, Some(&sign(&completed)), &completed)
        .await
        .expect("late payment acknowledged");
    assert_eq!(status_of(&app, order_id).await, OrderStatus::Canceled);
}

#[tokio::test]
async fn expiry_of_replaced_session_keeps_order_payable() {
    let app = TestApp::new();
    let ctx = user();
    app.ready_cart(&ctx).await;
    let started = checkout_service::start_checkout(&app.state, &ctx)
        .await
        .expect("checkout")
        .data
        .expect("checkout data");
    let order_id = started.order.order.id;
    let first_session = started.session.id;

    let retry = checkout_service::create_checkout_session(&app.state, &ctx, order_id)
        .await
        .expect("retry session")
        .data
        .expect("session");
    assert_ne!(retry.id, first_session);
    assert_eq!(current_session(&app, order_id).await, retry.id);

    let stale = session_event_for(
        "checkout.session.expired",
        &first_session,
        Some(&order_id.to_string()),
    );
    webhook_service::handle_payment_event(&app.state, Some(&sign(&stale)), &stale)
        .await
        .expect("stale expiry acknowledged");
    assert_eq!(status_of(&app, order_id).await, OrderStatus::Pending);
    let expired_audits = app
        .store
        .audit_entries()
        .await
        .into_iter()
        .filter(|entry| entry.action == "order_expired")
        .count();
    assert_eq!(expired_audits, 0);

    let completed = session_event_for(
        "checkout.session.completed",
        &retry.id,
        Some(&order_id.to_string()),
    );
    webhook_service::handle_payment_event(&app.state, Some(&sign(&completed)), &completed)
        .await
        .expect("payment on retry session");
    assert_eq!(status_of(&app, order_id).await, OrderStatus::Paid);
}

#[tokio::test]
async fn expiry_without_session_id_or_for_unknown_order_is_bad_request() {
    let app = TestApp::new();
    let order_id = pending_order(&app).await;

    let payload = serde_json::to_vec(&serde_json::json!({
        "id": "evt_no_session",
        "type": "checkout.session.expired",
        "data": { "object": { "metadata": { "orderId": order_id.to_string() } } }
    }))
    .expect("serialize event");
    let err = webhook_service::handle_payment_event(&app.state, Some(&sign(&payload)), &payload)
        .await
        .expect_err("no session id");
    assert!(matches!(err, AppError::BadRequest(_)));

    let payload = session_event("checkout.session.expired", Some(&Uuid::new_v4().to_string()));
    let err = webhook_service::handle_payment_event(&app.state, Some(&sign(&payload)), &payload)
        .await
        .expect_err("unknown order");
    assert!(matches!(err, AppError::BadRequest(_)));

    assert_eq!(status_of(&app, order_id).await, OrderStatus::Pending);
}
