use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{
    CheckoutSession, CheckoutSessionRequest, GatewayError, ORDER_ID_METADATA_KEY, PaymentGateway,
};
use crate::config::PaymentConfig;

/// HTTP client for a Stripe-compatible checkout API.
#[derive(Clone)]
pub struct StripeGateway {
    inner: Arc<StripeGatewayInner>,
}

struct StripeGatewayInner {
    client: reqwest::Client,
    api_base: String,
    secret_key: SecretString,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("api_base", &self.inner.api_base)
            .field("secret_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            inner: Arc::new(StripeGatewayInner {
                client,
                api_base: config.api_base.clone(),
                secret_key: config.secret_key.clone(),
            }),
        })
    }
}

/// Flatten a session request into the bracketed form fields the API expects.
pub(crate) fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("client_reference_id".to_string(), request.order_id.to_string()),
        (
            format!("metadata[{ORDER_ID_METADATA_KEY}]"),
            request.order_id.to_string(),
        ),
    ];

    for (i, line) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            request.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            line.unit_amount.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            line.name.clone(),
        ));
        if !line.description.is_empty() {
            form.push((
                format!("{prefix}[price_data][product_data][description]"),
                line.description.clone(),
            ));
        }
        if !line.image_url.is_empty() {
            form.push((
                format!("{prefix}[price_data][product_data][images][0]"),
                line.image_url.clone(),
            ));
        }
        form.push((format!("{prefix}[quantity]"), line.quantity.to_string()));
    }

    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let url = format!("{}/v1/checkout/sessions", self.inner.api_base);
        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(self.inner.secret_key.expose_secret())
            .form(&session_form(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or(body);
            tracing::error!(status = %status, order_id = %request.order_id, "checkout session rejected");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;
        let url = session
            .url
            .ok_or_else(|| GatewayError::Parse("session has no redirect url".into()))?;

        tracing::info!(order_id = %request.order_id, session_id = %session.id, "checkout session created");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}
