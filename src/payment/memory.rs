use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use super::{CheckoutSession, CheckoutSessionRequest, GatewayError, PaymentGateway};

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    requests: Vec<CheckoutSessionRequest>,
    next_id: u32,
    fail_on_create: bool,
    hold: Option<GatewayHold>,
}

/// Pauses the next session creation until `release` is notified.
#[derive(Debug, Clone, Default)]
pub struct GatewayHold {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// In-memory gateway for tests and local runs without network access.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<Mutex<InMemoryGatewayState>>,
}

impl InMemoryPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent session creations fail as if the gateway were down.
    pub async fn set_fail_on_create(&self, fail: bool) {
        self.state.lock().await.fail_on_create = fail;
    }

    /// Park the next `create_checkout_session` call. `entered` fires once the
    /// call is inside the gateway.
    pub async fn hold(&self) -> GatewayHold {
        let hold = GatewayHold::default();
        self.state.lock().await.hold = Some(hold.clone());
        hold
    }

    /// Requests that produced a session, oldest first.
    pub async fn requests(&self) -> Vec<CheckoutSessionRequest> {
        self.state.lock().await.requests.clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let hold = self.state.lock().await.hold.take();
        if let Some(hold) = hold {
            hold.entered.notify_one();
            hold.release.notified().await;
        }
        tokio::task::yield_now().await;

        let mut state = self.state.lock().await;
        if state.fail_on_create {
            return Err(GatewayError::Unavailable("gateway offline".into()));
        }

        state.next_id += 1;
        let id = format!("cs_test_{:04}", state.next_id);
        state.requests.push(request.clone());

        Ok(CheckoutSession {
            url: format!("https://checkout.example.com/pay/{id}"),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn request() -> CheckoutSessionRequest {
        CheckoutSessionRequest {
            order_id: Uuid::new_v4(),
            currency: "brl".into(),
            success_url: "http://localhost/success".into(),
            cancel_url: "http://localhost/cancel".into(),
            line_items: vec![],
        }
    }

    #[tokio::test]
    async fn records_requests_with_sequential_ids() {
        let gateway = InMemoryPaymentGateway::new();
        let first = gateway.create_checkout_session(&request()).await.expect("first");
        let second = gateway.create_checkout_session(&request()).await.expect("second");

        assert_eq!(first.id, "cs_test_0001");
        assert_eq!(second.id, "cs_test_0002");
        assert_eq!(gateway.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn held_creation_waits_for_release() {
        let gateway = InMemoryPaymentGateway::new();
        let hold = gateway.hold().await;

        let pending = tokio::spawn({
            let gateway = gateway.clone();
            async move { gateway.create_checkout_session(&request()).await }
        });
        hold.entered.notified().await;
        assert!(gateway.requests().await.is_empty());

        hold.release.notify_one();
        let session = pending.await.expect("join").expect("session");
        assert_eq!(session.id, "cs_test_0001");
        assert_eq!(gateway.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn fails_when_configured() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_fail_on_create(true).await;

        assert!(gateway.create_checkout_session(&request()).await.is_err());
        assert!(gateway.requests().await.is_empty());
    }
}
