//! In-memory repositories with the same atomicity guarantees as Postgres:
//! every operation runs under one lock.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    AddressRepository, AuditRepository, CartRepository, CatalogRepository, NewAuditEntry,
    OrderQuery, OrderRepository, StatusChange,
};
use crate::{
    domain::{OrderDraft, ensure_owner, quantity_after_add, quantity_after_decrease},
    error::{AppError, AppResult},
    models::{
        AuditEntry, Cart, CartItem, CartLine, CartWithItems, Order, OrderItem, OrderLine,
        OrderStatus, OrderWithItems, ProductVariant, ShippingAddress,
    },
};

#[derive(Debug, Default)]
struct MemoryState {
    variants: HashMap<Uuid, ProductVariant>,
    addresses: HashMap<Uuid, ShippingAddress>,
    carts: HashMap<Uuid, Cart>,
    cart_items: HashMap<Uuid, CartItem>,
    orders: HashMap<Uuid, Order>,
    order_items: Vec<OrderItem>,
    audit: Vec<AuditEntry>,
}

impl MemoryState {
    fn cart_for_user(&self, user_id: Uuid) -> Option<&Cart> {
        self.carts.values().find(|cart| cart.user_id == user_id)
    }

    fn load_cart(&self, cart: &Cart) -> CartWithItems {
        let mut lines: Vec<CartLine> = self
            .cart_items
            .values()
            .filter(|item| item.cart_id == cart.id)
            .filter_map(|item| {
                let variant = self.variants.get(&item.product_variant_id)?.clone();
                Some(CartLine {
                    item: item.clone(),
                    variant,
                })
            })
            .collect();
        lines.sort_by_key(|line| line.item.created_at);

        let address = cart
            .shipping_address_id
            .and_then(|id| self.addresses.get(&id))
            .cloned();
        CartWithItems::new(cart.clone(), address, lines)
    }

    fn order_with_items(&self, order: &Order) -> OrderWithItems {
        let items = self
            .order_items
            .iter()
            .filter(|item| item.order_id == order.id)
            .filter_map(|item| {
                let variant = self.variants.get(&item.product_variant_id)?.clone();
                Some(OrderLine {
                    item: item.clone(),
                    variant,
                })
            })
            .collect();
        OrderWithItems {
            order: order.clone(),
            items,
        }
    }

    fn owned_item(&self, user_id: Uuid, item_id: Uuid) -> AppResult<CartItem> {
        let item = self.cart_items.get(&item_id).ok_or(AppError::NotFound)?;
        let cart = self.carts.get(&item.cart_id).ok_or(AppError::NotFound)?;
        ensure_owner(cart.user_id, user_id)?;
        Ok(item.clone())
    }

    fn cart_id_or_create(&mut self, user_id: Uuid) -> Uuid {
        if let Some(cart) = self.cart_for_user(user_id) {
            return cart.id;
        }
        let cart = Cart {
            id: Uuid::new_v4(),
            user_id,
            shipping_address_id: None,
            created_at: Utc::now(),
        };
        let id = cart.id;
        self.carts.insert(id, cart);
        id
    }

    /// The line `variant_id` would have after adding `quantity`; not yet stored.
    fn merged_line(&self, cart_id: Uuid, variant_id: Uuid, quantity: i32) -> AppResult<CartItem> {
        let existing = self
            .cart_items
            .values()
            .find(|item| item.cart_id == cart_id && item.product_variant_id == variant_id);
        match existing {
            Some(item) => Ok(CartItem {
                quantity: quantity_after_add(item.quantity, quantity)?,
                ..item.clone()
            }),
            None => Ok(CartItem {
                id: Uuid::new_v4(),
                cart_id,
                product_variant_id: variant_id,
                quantity,
                created_at: Utc::now(),
            }),
        }
    }
}

/// Process-local store implementing every repository trait.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a purchasable variant.
    pub async fn add_variant(&self, variant: ProductVariant) -> ProductVariant {
        self.state
            .lock()
            .await
            .variants
            .insert(variant.id, variant.clone());
        variant
    }

    /// Change a catalog price; existing orders keep their snapshot.
    pub async fn set_variant_price(&self, variant_id: Uuid, price_in_cents: i64) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let variant = state.variants.get_mut(&variant_id).ok_or(AppError::NotFound)?;
        variant.price_in_cents = price_in_cents;
        Ok(())
    }

    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.state.lock().await.audit.clone()
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }
}

#[async_trait]
impl AddressRepository for InMemoryStore {
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<ShippingAddress>> {
        let state = self.state.lock().await;
        let mut addresses: Vec<ShippingAddress> = state
            .addresses
            .values()
            .filter(|address| address.user_id == user_id)
            .cloned()
            .collect();
        addresses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(addresses)
    }

    async fn insert(&self, address: ShippingAddress) -> AppResult<ShippingAddress> {
        let mut state = self.state.lock().await;
        state.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn delete_owned(&self, user_id: Uuid, address_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let address = state.addresses.get(&address_id).ok_or(AppError::NotFound)?;
        ensure_owner(address.user_id, user_id)?;

        state.addresses.remove(&address_id);
        for cart in state.carts.values_mut() {
            if cart.shipping_address_id == Some(address_id) {
                cart.shipping_address_id = None;
            }
        }
        for order in state.orders.values_mut() {
            if order.shipping_address_id == Some(address_id) {
                order.shipping_address_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn load_with_items(&self, user_id: Uuid) -> AppResult<Option<CartWithItems>> {
        let state = self.state.lock().await;
        Ok(state.cart_for_user(user_id).map(|cart| state.load_cart(cart)))
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        variant_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartItem> {
        let mut state = self.state.lock().await;
        if !state.variants.contains_key(&variant_id) {
            return Err(AppError::NotFound);
        }

        let cart_id = state.cart_id_or_create(user_id);
        let item = state.merged_line(cart_id, variant_id, quantity)?;
        state.cart_items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn decrease_item(&self, user_id: Uuid, item_id: Uuid) -> AppResult<Option<CartItem>> {
        let mut state = self.state.lock().await;
        let item = state.owned_item(user_id, item_id)?;

        match quantity_after_decrease(item.quantity) {
            Some(next) => {
                let updated = CartItem {
                    quantity: next,
                    ..item
                };
                state.cart_items.insert(updated.id, updated.clone());
                Ok(Some(updated))
            }
            None => {
                state.cart_items.remove(&item.id);
                Ok(None)
            }
        }
    }

    async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let item = state.owned_item(user_id, item_id)?;
        state.cart_items.remove(&item.id);
        Ok(())
    }

    async fn set_shipping_address(&self, user_id: Uuid, address_id: Uuid) -> AppResult<Cart> {
        let mut state = self.state.lock().await;
        let address = state.addresses.get(&address_id).ok_or(AppError::NotFound)?;
        ensure_owner(address.user_id, user_id)?;

        let cart = state
            .carts
            .values_mut()
            .find(|cart| cart.user_id == user_id)
            .ok_or(AppError::NotFound)?;
        cart.shipping_address_id = Some(address_id);
        Ok(cart.clone())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn place_from_cart(&self, user_id: Uuid, order_id: Uuid) -> AppResult<OrderWithItems> {
        let mut state = self.state.lock().await;
        let cart = state
            .cart_for_user(user_id)
            .ok_or_else(|| AppError::Validation("cart is empty".into()))?;
        let snapshot = state.load_cart(cart);
        let draft = OrderDraft::from_cart(order_id, &snapshot)?;

        let now = Utc::now();
        let order = Order {
            id: draft.order_id,
            user_id: draft.user_id,
            shipping_address_id: Some(draft.shipping_address_id),
            shipping: draft.shipping.clone(),
            total_price_in_cents: draft.total_price_in_cents,
            status: OrderStatus::Pending,
            checkout_session_id: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut lines = Vec::with_capacity(draft.items.len());
        for (item, line) in draft.items.iter().zip(snapshot.items.iter()) {
            let order_item = OrderItem {
                id: Uuid::new_v4(),
                order_id: order.id,
                product_variant_id: item.product_variant_id,
                quantity: item.quantity,
                price_in_cents: item.price_in_cents,
                created_at: now,
            };
            state.order_items.push(order_item.clone());
            lines.push(OrderLine {
                item: order_item,
                variant: line.variant.clone(),
            });
        }
        state.orders.insert(order.id, order.clone());
        for line in &snapshot.items {
            state.cart_items.remove(&line.item.id);
        }

        Ok(OrderWithItems {
            order,
            items: lines,
        })
    }

    async fn find_by_id(&self, order_id: Uuid) -> AppResult<Option<OrderWithItems>> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .get(&order_id)
            .map(|order| state.order_with_items(order)))
    }

    async fn list_by_user(&self, user_id: Uuid, query: OrderQuery) -> AppResult<(Vec<Order>, u64)> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .filter(|order| query.status.is_none_or(|status| order.status == status))
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.created_at);
        if query.newest_first {
            orders.reverse();
        }

        let total = orders.len() as u64;
        let page = orders
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn attach_checkout_session(&self, order_id: Uuid, session_id: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let order = state.orders.get_mut(&order_id).ok_or(AppError::NotFound)?;
        order.checkout_session_id = Some(session_id.to_string());
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn return_to_cart(&self, order_id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let Some(order) = state
            .orders
            .get(&order_id)
            .filter(|order| order.status == OrderStatus::Pending)
            .cloned()
        else {
            return Ok(false);
        };

        let cart_id = state.cart_id_or_create(order.user_id);
        let lines = state
            .order_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .map(|item| state.merged_line(cart_id, item.product_variant_id, item.quantity))
            .collect::<AppResult<Vec<_>>>()?;

        for line in lines {
            state.cart_items.insert(line.id, line);
        }
        state.orders.remove(&order_id);
        state.order_items.retain(|item| item.order_id != order_id);
        Ok(true)
    }

    async fn transition_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> AppResult<StatusChange> {
        if !from.can_transition_to(to) {
            return Err(AppError::Validation(format!(
                "cannot move an order from {from} to {to}"
            )));
        }

        let mut state = self.state.lock().await;
        let order = state.orders.get_mut(&order_id).ok_or(AppError::NotFound)?;
        if order.status != from {
            return Ok(StatusChange::Unchanged(order.clone()));
        }

        let now = Utc::now();
        order.status = to;
        order.updated_at = now;
        if to == OrderStatus::Paid {
            order.paid_at = Some(now);
        }
        Ok(StatusChange::Applied(order.clone()))
    }

    async fn expire_session(&self, order_id: Uuid, session_id: &str) -> AppResult<StatusChange> {
        let mut state = self.state.lock().await;
        let order = state.orders.get_mut(&order_id).ok_or(AppError::NotFound)?;
        let current = order.checkout_session_id.as_deref() == Some(session_id);
        if order.status != OrderStatus::Pending || !current {
            return Ok(StatusChange::Unchanged(order.clone()));
        }

        order.status = OrderStatus::Canceled;
        order.updated_at = Utc::now();
        Ok(StatusChange::Applied(order.clone()))
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn find_variant_by_slug(&self, slug: &str) -> AppResult<Option<ProductVariant>> {
        let state = self.state.lock().await;
        Ok(state.variants.values().find(|v| v.slug == slug).cloned())
    }
}

#[async_trait]
impl AuditRepository for InMemoryStore {
    async fn record(&self, entry: NewAuditEntry) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.audit.push(AuditEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            action: entry.action,
            resource: entry.resource,
            metadata: entry.metadata,
            created_at: Utc::now(),
        });
        Ok(())
    }
}
