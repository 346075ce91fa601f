use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, DecreaseResult},
    error::{AppError, AppResult},
    middleware::auth::AuthContext,
    models::{Cart, CartItem, CartWithItems},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Current cart, or `None` when the user has never added anything.
pub async fn get_cart(
    state: &AppState,
    ctx: &AuthContext,
) -> AppResult<ApiResponse<Option<CartWithItems>>> {
    let cart = state.carts.load_with_items(ctx.user_id).await?;
    let meta = cart
        .as_ref()
        .map(|c| Meta::total(c.items.len()))
        .unwrap_or_else(Meta::empty);
    Ok(ApiResponse::success("OK", cart, Some(meta)))
}

pub async fn add_item(
    state: &AppState,
    ctx: &AuthContext,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let quantity = payload.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::Validation(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let item = state
        .carts
        .add_item(ctx.user_id, payload.product_variant_id, quantity)
        .await?;

    tracing::debug!(
        user_id = %ctx.user_id,
        variant_id = %payload.product_variant_id,
        quantity = item.quantity,
        "cart item added"
    );
    log_audit(
        state.audit.as_ref(),
        Some(ctx.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({
            "product_variant_id": payload.product_variant_id,
            "quantity": quantity,
        })),
    )
    .await;

    Ok(ApiResponse::success("Added to cart", item, Some(Meta::empty())))
}

pub async fn decrease_item(
    state: &AppState,
    ctx: &AuthContext,
    item_id: Uuid,
) -> AppResult<ApiResponse<DecreaseResult>> {
    let item = state.carts.decrease_item(ctx.user_id, item_id).await?;

    log_audit(
        state.audit.as_ref(),
        Some(ctx.user_id),
        "cart_decrease",
        Some("cart_items"),
        Some(serde_json::json!({ "cart_item_id": item_id, "removed": item.is_none() })),
    )
    .await;

    Ok(ApiResponse::success(
        "OK",
        DecreaseResult {
            removed: item.is_none(),
            item,
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_item(
    state: &AppState,
    ctx: &AuthContext,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.carts.remove_item(ctx.user_id, item_id).await?;

    log_audit(
        state.audit.as_ref(),
        Some(ctx.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "cart_item_id": item_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn set_shipping_address(
    state: &AppState,
    ctx: &AuthContext,
    address_id: Uuid,
) -> AppResult<ApiResponse<Cart>> {
    let cart = state
        .carts
        .set_shipping_address(ctx.user_id, address_id)
        .await?;

    log_audit(
        state.audit.as_ref(),
        Some(ctx.user_id),
        "cart_shipping_address",
        Some("carts"),
        Some(serde_json::json!({ "cart_id": cart.id, "address_id": address_id })),
    )
    .await;

    Ok(ApiResponse::success("Shipping address selected", cart, Some(Meta::empty())))
}
