use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
    sea_query::{LockType, OnConflict},
};
use uuid::Uuid;

use super::{OrmStore, cart_from_entity, cart_item_from_entity, load_cart};
use crate::{
    domain::{ensure_owner, quantity_after_add, quantity_after_decrease},
    entity::{
        CartItems, Carts, ProductVariants, ShippingAddresses,
        cart_items::{self, ActiveModel as CartItemActive, Column as CartItemCol},
        carts::{self, ActiveModel as CartActive, Column as CartCol},
    },
    error::{AppError, AppResult},
    models::{Cart, CartItem, CartWithItems},
    repository::CartRepository,
};

/// Locks the user's cart row, creating it first if needed.
pub(super) async fn lock_or_create_cart(txn: &DatabaseTransaction, user_id: Uuid) -> AppResult<carts::Model> {
    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        shipping_address_id: Set(None),
        created_at: NotSet,
    };
    Carts::insert(cart)
        .on_conflict(OnConflict::column(CartCol::UserId).do_nothing().to_owned())
        .exec_without_returning(txn)
        .await?;

    Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart missing after upsert")))
}

/// Adds `quantity` of `variant_id` to the cart, merging into an existing line.
pub(super) async fn merge_line(
    txn: &DatabaseTransaction,
    cart_id: Uuid,
    variant_id: Uuid,
    quantity: i32,
) -> AppResult<cart_items::Model> {
    let existing = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .filter(CartItemCol::ProductVariantId.eq(variant_id))
        .lock(LockType::Update)
        .one(txn)
        .await?;

    let item = match existing {
        Some(item) => {
            let next = quantity_after_add(item.quantity, quantity)?;
            let mut active: CartItemActive = item.into();
            active.quantity = Set(next);
            active.update(txn).await?
        }
        None => {
            CartItemActive {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart_id),
                product_variant_id: Set(variant_id),
                quantity: Set(quantity),
                created_at: NotSet,
            }
            .insert(txn)
            .await?
        }
    };
    Ok(item)
}

/// Locks a line and checks it sits in the caller's cart.
async fn lock_owned_item(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    item_id: Uuid,
) -> AppResult<cart_items::Model> {
    let item = CartItems::find_by_id(item_id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let cart = Carts::find_by_id(item.cart_id)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(cart.user_id, user_id)?;
    Ok(item)
}

#[async_trait]
impl CartRepository for OrmStore {
    async fn load_with_items(&self, user_id: Uuid) -> AppResult<Option<CartWithItems>> {
        let cart = Carts::find()
            .filter(CartCol::UserId.eq(user_id))
            .one(&self.conn)
            .await?;
        match cart {
            Some(cart) => Ok(Some(load_cart(&self.conn, cart).await?)),
            None => Ok(None),
        }
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        variant_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartItem> {
        let txn = self.conn.begin().await?;

        if ProductVariants::find_by_id(variant_id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let cart = lock_or_create_cart(&txn, user_id).await?;
        let item = merge_line(&txn, cart.id, variant_id, quantity).await?;

        txn.commit().await?;
        Ok(cart_item_from_entity(item))
    }

    async fn decrease_item(&self, user_id: Uuid, item_id: Uuid) -> AppResult<Option<CartItem>> {
        let txn = self.conn.begin().await?;
        let item = lock_owned_item(&txn, user_id, item_id).await?;

        let result = match quantity_after_decrease(item.quantity) {
            Some(next) => {
                let mut active: CartItemActive = item.into();
                active.quantity = Set(next);
                Some(cart_item_from_entity(active.update(&txn).await?))
            }
            None => {
                CartItems::delete_by_id(item.id).exec(&txn).await?;
                None
            }
        };

        txn.commit().await?;
        Ok(result)
    }

    async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> AppResult<()> {
        let txn = self.conn.begin().await?;
        let item = lock_owned_item(&txn, user_id, item_id).await?;
        CartItems::delete_by_id(item.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn set_shipping_address(&self, user_id: Uuid, address_id: Uuid) -> AppResult<Cart> {
        let txn = self.conn.begin().await?;

        let address = ShippingAddresses::find_by_id(address_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;
        ensure_owner(address.user_id, user_id)?;

        let cart = Carts::find()
            .filter(CartCol::UserId.eq(user_id))
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: CartActive = cart.into();
        active.shipping_address_id = Set(Some(address.id));
        let cart = active.update(&txn).await?;

        txn.commit().await?;
        Ok(cart_from_entity(cart))
    }
}
