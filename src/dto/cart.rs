use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CartItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_variant_id: Uuid,
    /// Defaults to 1.
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetShippingAddressRequest {
    pub shipping_address_id: Uuid,
}

/// Result of removing one unit; `item` is absent once the line is gone.
#[derive(Debug, Serialize, ToSchema)]
pub struct DecreaseResult {
    pub removed: bool,
    pub item: Option<CartItem>,
}
