//! Storage-independent checkout rules shared by every repository implementation.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{AddressSnapshot, CartWithItems, OrderStatus},
};

/// Rejects access to a row owned by someone else.
pub fn ensure_owner(owner_id: Uuid, user_id: Uuid) -> AppResult<()> {
    if owner_id != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Quantity left after removing one unit, or `None` when the line must be deleted.
pub fn quantity_after_decrease(quantity: i32) -> Option<i32> {
    let next = quantity.saturating_sub(1);
    (next > 0).then_some(next)
}

/// Quantity after adding `amount` units to an existing line.
pub fn quantity_after_add(quantity: i32, amount: i32) -> AppResult<i32> {
    quantity
        .checked_add(amount)
        .ok_or_else(|| AppError::Validation("quantity is too large".into()))
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Paid) | (OrderStatus::Pending, OrderStatus::Canceled)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraftItem {
    pub product_variant_id: Uuid,
    pub quantity: i32,
    pub price_in_cents: i64,
}

/// Everything needed to insert a pending order, computed from a cart snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub shipping_address_id: Uuid,
    pub shipping: AddressSnapshot,
    pub items: Vec<OrderDraftItem>,
    pub total_price_in_cents: i64,
}

impl OrderDraft {
    /// Snapshot prices, quantities and the shipping address of `cart`.
    ///
    /// `order_id` is the correlation key later echoed by the payment gateway, so
    /// it is chosen by the caller before anything is sent out.
    pub fn from_cart(order_id: Uuid, cart: &CartWithItems) -> AppResult<Self> {
        if cart.items.is_empty() {
            return Err(AppError::Validation("cart is empty".into()));
        }
        let address = cart
            .shipping_address
            .as_ref()
            .ok_or_else(|| AppError::Validation("cart has no shipping address".into()))?;
        ensure_owner(address.user_id, cart.cart.user_id)?;

        let mut total: i64 = 0;
        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            if line.item.quantity < 1 {
                return Err(AppError::Validation(format!(
                    "invalid quantity for variant {}",
                    line.variant.id
                )));
            }
            let subtotal = line
                .variant
                .price_in_cents
                .checked_mul(i64::from(line.item.quantity))
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or_else(|| AppError::Validation("order total overflows".into()))?;
            total = subtotal;
            items.push(OrderDraftItem {
                product_variant_id: line.variant.id,
                quantity: line.item.quantity,
                price_in_cents: line.variant.price_in_cents,
            });
        }

        Ok(Self {
            order_id,
            user_id: cart.cart.user_id,
            shipping_address_id: address.id,
            shipping: AddressSnapshot::from(address),
            items,
            total_price_in_cents: total,
        })
    }
}
