use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{Order, OrderWithItems},
    payment::CheckoutSession,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// Pending order plus the gateway session the buyer is redirected to.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutStarted {
    pub order: OrderWithItems,
    pub session: CheckoutSession,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}
