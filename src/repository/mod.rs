//! Storage seams for the cart/order state machine.
//!
//! Every mutating method is one atomic unit: ownership and existence checks
//! run inside the same transaction (or lock) as the write, so a rejected call
//! leaves no partial state behind.

mod memory;
mod orm;

pub use memory::InMemoryStore;
pub use orm::OrmStore;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Cart, CartItem, CartWithItems, Order, OrderStatus, OrderWithItems, ProductVariant,
        ShippingAddress,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub newest_first: bool,
    pub limit: u64,
    pub offset: u64,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            status: None,
            newest_first: true,
            limit: 20,
            offset: 0,
        }
    }
}

/// Outcome of a conditional status update.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    /// The order was in the expected state and moved.
    Applied(Order),
    /// The order was already elsewhere; nothing was written.
    Unchanged(Order),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    pub metadata: Option<Value>,
}

#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Addresses owned by `user_id`, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<ShippingAddress>>;

    async fn insert(&self, address: ShippingAddress) -> AppResult<ShippingAddress>;

    /// Fails with `NotFound`/`Forbidden` unless `user_id` owns the address.
    async fn delete_owned(&self, user_id: Uuid, address_id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn load_with_items(&self, user_id: Uuid) -> AppResult<Option<CartWithItems>>;

    /// Creates the cart on first use and merges repeated variants into one line.
    async fn add_item(&self, user_id: Uuid, variant_id: Uuid, quantity: i32)
    -> AppResult<CartItem>;

    /// Returns the updated line, or `None` when the last unit was removed.
    async fn decrease_item(&self, user_id: Uuid, item_id: Uuid) -> AppResult<Option<CartItem>>;

    async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> AppResult<()>;

    async fn set_shipping_address(&self, user_id: Uuid, address_id: Uuid) -> AppResult<Cart>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Snapshot the user's cart into a pending order keyed by `order_id`.
    ///
    /// The snapshotted lines leave the cart in the same transaction, so a
    /// concurrent checkout of the same cart finds it empty. Lines added
    /// afterwards stay in the cart.
    async fn place_from_cart(&self, user_id: Uuid, order_id: Uuid) -> AppResult<OrderWithItems>;

    /// Lookup by correlation key.
    async fn find_by_id(&self, order_id: Uuid) -> AppResult<Option<OrderWithItems>>;

    async fn list_by_user(&self, user_id: Uuid, query: OrderQuery) -> AppResult<(Vec<Order>, u64)>;

    async fn attach_checkout_session(&self, order_id: Uuid, session_id: &str) -> AppResult<()>;

    /// Deletes a still-pending order and merges its lines back into the
    /// owner's cart. Returns `false` when the order is gone or no longer pending.
    async fn return_to_cart(&self, order_id: Uuid) -> AppResult<bool>;

    /// Moves `order_id` from `from` to `to` only if it is currently in `from`.
    async fn transition_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> AppResult<StatusChange>;

    /// Pending → canceled, only while `session_id` is the order's current
    /// session. An expired superseded session leaves the order alone.
    async fn expire_session(&self, order_id: Uuid, session_id: &str) -> AppResult<StatusChange>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_variant_by_slug(&self, slug: &str) -> AppResult<Option<ProductVariant>>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn record(&self, entry: NewAuditEntry) -> AppResult<()>;
}
