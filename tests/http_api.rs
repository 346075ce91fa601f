mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use common::{JWT_SECRET, TestApp, session_event, sign, user};
use serde_json::Value;
use storefront_checkout::{
    middleware::auth::issue_token,
    models::OrderStatus,
    payment::SIGNATURE_HEADER,
    routes::create_app,
};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::new();
    let router = create_app(app.state.clone());

    let response = router
        .clone()
        .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Unauthorized");

    let response = router
        .oneshot(
            Request::post("/api/checkout")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cart_round_trip_over_http() {
    let app = TestApp::new();
    let ctx = user();
    let tee = app.variant("T-shirt", "White", 1000).await;
    let token = issue_token(ctx.user_id, JWT_SECRET, Duration::hours(1)).expect("token");
    let router = create_app(app.state.clone());

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/cart/items")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "product_variant_id": tee.id, "quantity": 2 }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::get("/api/cart")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_price_in_cents"], 2000);
    assert_eq!(body["data"]["items"][0]["item"]["quantity"], 2);
}

#[tokio::test]
async fn checkout_without_address_is_unprocessable() {
    let app = TestApp::new();
    let ctx = user();
    let tee = app.variant("T-shirt", "White", 1000).await;
    app.add(&ctx, &tee, 1).await;
    let token = issue_token(ctx.user_id, JWT_SECRET, Duration::hours(1)).expect("token");

    let response = create_app(app.state.clone())
        .oneshot(
            Request::post("/api/checkout")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn webhook_endpoint_verifies_raw_body() {
    let app = TestApp::new();
    let ctx = user();
    app.ready_cart(&ctx).await;
    let order_id = storefront_checkout::services::checkout_service::start_checkout(&app.state, &ctx)
        .await
        .expect("checkout")
        .data
        .expect("data")
        .order
        .order
        .id;
    let router = create_app(app.state.clone());
    let payload = session_event("checkout.session.completed", Some(&order_id.to_string()));

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/webhooks/payment")
                .header(SIGNATURE_HEADER, "t=1,v1=deadbeef")
                .body(Body::from(payload.clone()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(
            Request::post("/api/webhooks/payment")
                .header(SIGNATURE_HEADER, sign(&payload))
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["received"], true);

    let order = app.state.orders.find_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.order.status, OrderStatus::Paid);
}

#[tokio::test]
async fn unknown_path_uses_response_envelope() {
    let app = TestApp::new();
    let response = create_app(app.state)
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["data"]["path"], "/nope");
}
