use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use super::ORDER_ID_METADATA_KEY;
use crate::error::{AppError, AppResult};

/// Inbound gateway event, parsed only after its signature has been verified.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// The checkout-session object embedded in `checkout.session.*` events.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionObject {
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CheckoutCompleted,
    CheckoutExpired,
    Other,
}

impl WebhookEvent {
    pub fn from_slice(payload: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| AppError::BadRequest(format!("malformed event payload: {e}")))
    }

    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            "checkout.session.completed" => EventKind::CheckoutCompleted,
            "checkout.session.expired" => EventKind::CheckoutExpired,
            _ => EventKind::Other,
        }
    }

    pub fn session(&self) -> AppResult<SessionObject> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| AppError::BadRequest(format!("malformed session object: {e}")))
    }

    /// Order id echoed back from the session metadata.
    pub fn order_id(&self) -> AppResult<Uuid> {
        let session = self.session()?;
        let raw = session
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.get(ORDER_ID_METADATA_KEY))
            .ok_or_else(|| AppError::BadRequest("No orderId".into()))?;
        Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("invalid orderId `{raw}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(body: serde_json::Value) -> WebhookEvent {
        serde_json::from_value(body).expect("event")
    }

    #[test]
    fn extracts_order_id_from_metadata() {
        let order_id = Uuid::new_v4();
        let event = event(serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_1", "metadata": { "orderId": order_id.to_string() } } }
        }));
        assert_eq!(event.kind(), EventKind::CheckoutCompleted);
        assert_eq!(event.order_id().ok(), Some(order_id));
    }

    #[test]
    fn missing_metadata_is_bad_request() {
        let event = event(serde_json::json!({
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_1" } }
        }));
        assert!(matches!(event.order_id(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn unknown_types_are_other() {
        let event = event(serde_json::json!({
            "type": "payment_intent.created",
            "data": { "object": {} }
        }));
        assert_eq!(event.kind(), EventKind::Other);
    }
}
