//! Payment gateway seam: outbound checkout sessions and inbound webhook events.
//!
//! The gateway is opaque to the rest of the crate. Checkout code only knows
//! [`PaymentGateway`], and the webhook reconciler only sees verified
//! [`WebhookEvent`]s whose metadata carries the order id as correlation key.

mod event;
mod memory;
mod signature;
mod stripe;

pub use event::{EventKind, SessionObject, WebhookEvent};
pub use memory::{GatewayHold, InMemoryPaymentGateway};
pub use signature::{SIGNATURE_HEADER, SignatureError, sign_payload, verify_signature};
pub use stripe::StripeGateway;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Metadata key holding the correlation key on a checkout session.
pub const ORDER_ID_METADATA_KEY: &str = "orderId";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionLineItem {
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Minor currency units, passed through without conversion.
    pub unit_amount: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionRequest {
    pub order_id: Uuid,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub line_items: Vec<SessionLineItem>,
}

/// Gateway-issued handle the storefront redirects the buyer to.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;
}
