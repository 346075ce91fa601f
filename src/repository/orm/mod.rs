//! Postgres-backed repositories on SeaORM.

mod address;
mod audit;
mod cart;
mod catalog;
mod order;

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::{
        CartItems, ProductVariants, Products, ShippingAddresses, cart_items, carts,
        order_items, orders, product_variants, products, shipping_addresses,
    },
    error::{AppError, AppResult},
    models::{
        AddressSnapshot, Cart, CartItem, CartLine, CartWithItems, Order, OrderItem,
        ProductVariant, ShippingAddress,
    },
};

#[derive(Debug, Clone)]
pub struct OrmStore {
    conn: DatabaseConnection,
}

impl OrmStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

/// Variants by id, joined with their product for display fields.
async fn load_variants<C: ConnectionTrait>(
    db: &C,
    ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, ProductVariant>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = ProductVariants::find()
        .filter(product_variants::Column::Id.is_in(ids))
        .find_also_related(Products)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(variant, product)| (variant.id, variant_from_entity(variant, product)))
        .collect())
}

async fn load_cart<C: ConnectionTrait>(db: &C, cart: carts::Model) -> AppResult<CartWithItems> {
    let items = CartItems::find()
        .filter(cart_items::Column::CartId.eq(cart.id))
        .order_by_asc(cart_items::Column::CreatedAt)
        .all(db)
        .await?;

    let variants = load_variants(db, items.iter().map(|i| i.product_variant_id).collect()).await?;
    let lines = items
        .into_iter()
        .filter_map(|item| {
            let variant = variants.get(&item.product_variant_id)?.clone();
            Some(CartLine {
                item: cart_item_from_entity(item),
                variant,
            })
        })
        .collect();

    let shipping_address = match cart.shipping_address_id {
        Some(id) => ShippingAddresses::find_by_id(id)
            .one(db)
            .await?
            .map(address_from_entity),
        None => None,
    };

    Ok(CartWithItems::new(
        cart_from_entity(cart),
        shipping_address,
        lines,
    ))
}

fn variant_from_entity(
    model: product_variants::Model,
    product: Option<products::Model>,
) -> ProductVariant {
    let (product_name, product_description) = product
        .map(|p| (p.name, p.description))
        .unwrap_or_default();
    ProductVariant {
        id: model.id,
        product_id: model.product_id,
        product_name,
        product_description,
        name: model.name,
        slug: model.slug,
        color: model.color,
        price_in_cents: model.price_in_cents,
        image_url: model.image_url,
    }
}

fn address_from_entity(model: shipping_addresses::Model) -> ShippingAddress {
    ShippingAddress {
        id: model.id,
        user_id: model.user_id,
        recipient_name: model.recipient_name,
        street: model.street,
        number: model.number,
        complement: model.complement,
        neighborhood: model.neighborhood,
        city: model.city,
        state: model.state,
        zip_code: model.zip_code,
        country: model.country,
        phone: model.phone,
        email: model.email,
        tax_id: model.tax_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn cart_from_entity(model: carts::Model) -> Cart {
    Cart {
        id: model.id,
        user_id: model.user_id,
        shipping_address_id: model.shipping_address_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn cart_item_from_entity(model: cart_items::Model) -> CartItem {
    CartItem {
        id: model.id,
        cart_id: model.cart_id,
        product_variant_id: model.product_variant_id,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn order_from_entity(model: orders::Model) -> AppResult<Order> {
    let status = model
        .status
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        shipping_address_id: model.shipping_address_id,
        shipping: AddressSnapshot {
            recipient_name: model.recipient_name,
            street: model.street,
            number: model.number,
            complement: model.complement,
            neighborhood: model.neighborhood,
            city: model.city,
            state: model.state,
            zip_code: model.zip_code,
            country: model.country,
            phone: model.phone,
            email: model.email,
            tax_id: model.tax_id,
        },
        total_price_in_cents: model.total_price_in_cents,
        status,
        checkout_session_id: model.checkout_session_id,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn order_item_from_entity(model: order_items::Model) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_variant_id: model.product_variant_id,
        quantity: model.quantity,
        price_in_cents: model.price_in_cents,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
