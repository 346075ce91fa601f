use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        addresses::{AddressList, CreateAddressRequest},
        cart::{AddToCartRequest, DecreaseResult, SetShippingAddressRequest},
        orders::{CheckoutStarted, OrderList, WebhookAck},
    },
    models::{
        AddressSnapshot, Cart, CartItem, CartLine, CartWithItems, Order, OrderItem, OrderLine,
        OrderStatus, OrderWithItems, ProductVariant, ShippingAddress,
    },
    payment::CheckoutSession,
    response::{ApiResponse, Meta},
    routes::{addresses, cart, checkout, health, orders, params, variants, webhooks},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        addresses::list_addresses,
        addresses::create_address,
        addresses::delete_address,
        cart::get_cart,
        cart::add_to_cart,
        cart::decrease_cart_item,
        cart::remove_from_cart,
        cart::set_shipping_address,
        checkout::start_checkout,
        orders::list_orders,
        orders::get_order,
        orders::create_checkout_session,
        orders::cancel_order,
        variants::get_variant,
        webhooks::payment_webhook
    ),
    components(
        schemas(
            ProductVariant,
            ShippingAddress,
            AddressSnapshot,
            Cart,
            CartItem,
            CartLine,
            CartWithItems,
            Order,
            OrderItem,
            OrderLine,
            OrderStatus,
            OrderWithItems,
            CheckoutSession,
            CreateAddressRequest,
            AddressList,
            AddToCartRequest,
            SetShippingAddressRequest,
            DecreaseResult,
            OrderList,
            CheckoutStarted,
            WebhookAck,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<CartWithItems>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CheckoutStarted>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Addresses", description = "Shipping address book"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Checkout", description = "Cart to order to payment session"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Catalog", description = "Product variant lookup"),
        (name = "Webhooks", description = "Payment gateway callbacks"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
