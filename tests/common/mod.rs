#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;
use storefront_checkout::{
    config::{AppConfig, PaymentConfig},
    dto::{addresses::CreateAddressRequest, cart::AddToCartRequest},
    middleware::auth::AuthContext,
    models::{ProductVariant, ShippingAddress},
    payment::{InMemoryPaymentGateway, sign_payload},
    repository::InMemoryStore,
    services::{address_service, cart_service},
    state::AppState,
};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: SecretString::from(JWT_SECRET.to_string()),
        app_url: "http://shop.test".into(),
        payment: PaymentConfig {
            api_base: "http://gateway.invalid".into(),
            secret_key: SecretString::from("sk_test".to_string()),
            webhook_secret: SecretString::from(WEBHOOK_SECRET.to_string()),
            currency: "brl".into(),
            webhook_tolerance_secs: PaymentConfig::DEFAULT_TOLERANCE_SECS,
        },
    }
}

/// In-memory application with handles on the store and gateway for assertions.
pub struct TestApp {
    pub state: AppState,
    pub store: InMemoryStore,
    pub gateway: InMemoryPaymentGateway,
}

impl TestApp {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let gateway = InMemoryPaymentGateway::new();
        let state = AppState::new(store.clone(), Arc::new(gateway.clone()), test_config());
        Self {
            state,
            store,
            gateway,
        }
    }

    pub async fn variant(&self, product: &str, name: &str, price_in_cents: i64) -> ProductVariant {
        let slug = format!("{}-{}", product, name).to_lowercase().replace(' ', "-");
        self.store
            .add_variant(ProductVariant {
                id: Uuid::new_v4(),
                product_id: Uuid::new_v4(),
                product_name: product.into(),
                product_description: format!("{product} description"),
                name: name.into(),
                slug: slug.clone(),
                color: name.to_lowercase(),
                price_in_cents,
                image_url: format!("https://cdn.test/{slug}.jpg"),
            })
            .await
    }

    pub async fn address(&self, ctx: &AuthContext) -> ShippingAddress {
        address_service::create_address(&self.state, ctx, address_request())
            .await
            .expect("create address")
            .data
            .expect("address data")
    }

    pub async fn add(&self, ctx: &AuthContext, variant: &ProductVariant, quantity: i32) {
        cart_service::add_item(
            &self.state,
            ctx,
            AddToCartRequest {
                product_variant_id: variant.id,
                quantity: Some(quantity),
            },
        )
        .await
        .expect("add to cart");
    }

    /// Cart with T-shirt ×2 at 1000 and Sneaker ×1 at 2500 plus a selected address.
    pub async fn ready_cart(&self, ctx: &AuthContext) -> (ProductVariant, ProductVariant) {
        let tee = self.variant("T-shirt", "White", 1000).await;
        let sneaker = self.variant("Sneaker", "Blue", 2500).await;
        self.add(ctx, &tee, 2).await;
        self.add(ctx, &sneaker, 1).await;

        let address = self.address(ctx).await;
        cart_service::set_shipping_address(&self.state, ctx, address.id)
            .await
            .expect("select address");
        (tee, sneaker)
    }
}

pub fn user() -> AuthContext {
    AuthContext::new(Uuid::new_v4())
}

pub fn address_request() -> CreateAddressRequest {
    CreateAddressRequest {
        recipient_name: "Maria Silva".into(),
        street: "Rua das Flores".into(),
        number: "123".into(),
        complement: Some("Apto 4".into()),
        neighborhood: "Centro".into(),
        city: "São Paulo".into(),
        state: "SP".into(),
        zip_code: "01310-100".into(),
        country: None,
        phone: "(11) 98765-4321".into(),
        email: "maria@example.com".into(),
        tax_id: "123.456.789-09".into(),
    }
}

/// Gateway event body for the first session the in-memory gateway hands out.
pub fn session_event(event_type: &str, order_id: Option<&str>) -> Vec<u8> {
    session_event_for(event_type, "cs_test_0001", order_id)
}

/// Gateway event body for `session_id` carrying `order_id` as metadata.
pub fn session_event_for(event_type: &str, session_id: &str, order_id: Option<&str>) -> Vec<u8> {
    let metadata = match order_id {
        Some(id) => serde_json::json!({ "orderId": id }),
        None => serde_json::json!({}),
    };
    serde_json::to_vec(&serde_json::json!({
        "id": format!("evt_{}", Uuid::new_v4().simple()),
        "type": event_type,
        "data": { "object": { "id": session_id, "metadata": metadata } }
    }))
    .expect("serialize event")
}

pub fn sign(payload: &[u8]) -> String {
    sign_payload(payload, WEBHOOK_SECRET, Utc::now().timestamp())
}
