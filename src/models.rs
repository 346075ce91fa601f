use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_description: String,
    pub name: String,
    pub slug: String,
    pub color: String,
    /// Minor currency units.
    pub price_in_cents: i64,
    pub image_url: String,
}

impl ProductVariant {
    /// Label shown on the payment page, e.g. `Sneaker - Blue`.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.product_name, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipient_name: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub tax_id: String,
    pub created_at: DateTime<Utc>,
}

/// Address fields copied onto an order at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AddressSnapshot {
    pub recipient_name: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub tax_id: String,
}

impl From<&ShippingAddress> for AddressSnapshot {
    fn from(address: &ShippingAddress) -> Self {
        Self {
            recipient_name: address.recipient_name.clone(),
            street: address.street.clone(),
            number: address.number.clone(),
            complement: address.complement.clone(),
            neighborhood: address.neighborhood.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip_code: address.zip_code.clone(),
            country: address.country.clone(),
            phone: address.phone.clone(),
            email: address.email.clone(),
            tax_id: address.tax_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_address_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_variant_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartLine {
    pub item: CartItem,
    pub variant: ProductVariant,
}

impl CartLine {
    pub fn subtotal_in_cents(&self) -> i64 {
        self.variant.price_in_cents * i64::from(self.item.quantity)
    }
}

/// Fully materialized cart: lines with variant data plus the selected address.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartWithItems {
    pub cart: Cart,
    pub shipping_address: Option<ShippingAddress>,
    pub items: Vec<CartLine>,
    pub total_price_in_cents: i64,
}

impl CartWithItems {
    pub fn new(cart: Cart, shipping_address: Option<ShippingAddress>, items: Vec<CartLine>) -> Self {
        let total_price_in_cents = items.iter().map(CartLine::subtotal_in_cents).sum();
        Self {
            cart,
            shipping_address,
            items,
            total_price_in_cents,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "canceled" => Ok(OrderStatus::Canceled),
            other => Err(format!("unknown order status `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_address_id: Option<Uuid>,
    pub shipping: AddressSnapshot,
    pub total_price_in_cents: i64,
    pub status: OrderStatus,
    pub checkout_session_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_variant_id: Uuid,
    pub quantity: i32,
    /// Unit price captured when the order was placed.
    pub price_in_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderLine {
    pub item: OrderItem,
    pub variant: ProductVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
