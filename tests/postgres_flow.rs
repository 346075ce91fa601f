mod common;

use std::sync::Arc;

use common::{address_request, session_event, session_event_for, sign, test_config};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, DatabaseConnection, Set, Statement};
use storefront_checkout::{
    db::{create_pool, orm_from_pool, run_migrations},
    dto::cart::AddToCartRequest,
    entity::{
        product_variants::ActiveModel as VariantActive, products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthContext,
    models::OrderStatus,
    payment::InMemoryPaymentGateway,
    repository::OrmStore,
    services::{
        address_service, cart_service, catalog_service, checkout_service, order_service,
        webhook_service,
    },
    state::AppState,
};
use uuid::Uuid;

// Integration flow against Postgres: cart -> checkout -> webhook, plus ownership and rollback checks.
#[tokio::test]
async fn checkout_and_webhook_flow_against_postgres() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run Postgres flow tests.");
            return Ok(());
        }
    };

    let (state, orm, gateway) = setup_state(&database_url).await?;

    let buyer = AuthContext::new(create_user(&orm, "buyer@example.com").await?);
    let intruder = AuthContext::new(create_user(&orm, "intruder@example.com").await?);
    let tee = create_variant(&orm, "tee", 1000).await?;
    let sneaker = create_variant(&orm, "sneaker", 2500).await?;

    // Repeated adds merge into one line.
    for (variant, quantity) in [(tee, 1), (tee, 1), (sneaker, 1)] {
        cart_service::add_item(
            &state,
            &buyer,
            AddToCartRequest {
                product_variant_id: variant,
                quantity: Some(quantity),
            },
        )
        .await?;
    }
    let cart = state.carts.load_with_items(buyer.user_id).await?.expect("cart");
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total_price_in_cents, 4500);

    // Another user's line is off limits.
    let err = cart_service::remove_item(&state, &intruder, cart.items[0].item.id)
        .await
        .expect_err("foreign line");
    assert!(matches!(err, AppError::Forbidden));

    let address = address_service::create_address(&state, &buyer, address_request())
        .await?
        .data
        .expect("address");
    let err = cart_service::set_shipping_address(&state, &intruder, address.id)
        .await
        .expect_err("foreign address");
    assert!(matches!(err, AppError::Forbidden));
    let err = address_service::delete_address(&state, &intruder, address.id)
        .await
        .expect_err("foreign delete");
    assert!(matches!(err, AppError::Forbidden));
    cart_service::set_shipping_address(&state, &buyer, address.id).await?;

    let variant = catalog_service::get_variant(&state, "tee")
        .await?
        .data
        .expect("variant");
    assert_eq!(variant.id, tee);

    // Gateway outage rolls the order back and keeps the cart.
    gateway.set_fail_on_create(true).await;
    let err = checkout_service::start_checkout(&state, &buyer)
        .await
        .expect_err("gateway down");
    assert!(matches!(err, AppError::ExternalService(_)));
    let (orders, total) = state
        .orders
        .list_by_user(buyer.user_id, Default::default())
        .await?;
    assert!(orders.is_empty());
    assert_eq!(total, 0);
    let cart = state.carts.load_with_items(buyer.user_id).await?.expect("cart");
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total_price_in_cents, 4500);
    gateway.set_fail_on_create(false).await;

    let started = checkout_service::start_checkout(&state, &buyer)
        .await?
        .data
        .expect("checkout");
    let order_id = started.order.order.id;
    assert_eq!(started.order.order.total_price_in_cents, 4500);
    assert_eq!(started.order.items.len(), 2);
    let cart = state.carts.load_with_items(buyer.user_id).await?.expect("cart");
    assert!(cart.items.is_empty());

    let err = order_service::get_order(&state, &intruder, order_id)
        .await
        .expect_err("foreign order");
    assert!(matches!(err, AppError::Forbidden));

    // A replaced session expiring leaves the order payable.
    let first_session = started.session.id;
    let retry = checkout_service::create_checkout_session(&state, &buyer, order_id)
        .await?
        .data
        .expect("retry session");
    let stale = session_event_for(
        "checkout.session.expired",
        &first_session,
        Some(&order_id.to_string()),
    );
    webhook_service::handle_payment_event(&state, Some(&sign(&stale)), &stale).await?;
    let order = state.orders.find_by_id(order_id).await?.expect("order").order;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.checkout_session_id.as_deref(), Some(retry.id.as_str()));

    // Duplicate deliveries settle on a single paid transition.
    let payload = session_event("checkout.session.completed", Some(&order_id.to_string()));
    let signature = sign(&payload);
    webhook_service::handle_payment_event(&state, Some(&signature), &payload).await?;
    let first = state.orders.find_by_id(order_id).await?.expect("order").order;
    assert_eq!(first.status, OrderStatus::Paid);
    webhook_service::handle_payment_event(&state, Some(&signature), &payload).await?;
    let second = state.orders.find_by_id(order_id).await?.expect("order").order;
    assert_eq!(second.status, OrderStatus::Paid);
    assert_eq!(first.paid_at, second.paid_at);

    let err = order_service::cancel_order(&state, &buyer, order_id)
        .await
        .expect_err("paid order");
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

async fn setup_state(
    database_url: &str,
) -> anyhow::Result<(AppState, DatabaseConnection, InMemoryPaymentGateway)> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    let orm = orm_from_pool(&pool);

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_items, carts, shipping_addresses, product_variants, products, audit_logs, users CASCADE",
    ))
    .await?;

    let gateway = InMemoryPaymentGateway::new();
    let state = AppState::new(
        OrmStore::new(orm.clone()),
        Arc::new(gateway.clone()),
        test_config(),
    );
    Ok((state, orm, gateway))
}

async fn create_user(orm: &DatabaseConnection, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set("Test User".into()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    Ok(user.id)
}

async fn create_variant(orm: &DatabaseConnection, slug: &str, price_in_cents: i64) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Product {slug}")),
        slug: Set(slug.to_string()),
        description: Set("Test product".into()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    let variant = VariantActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        name: Set("Default".into()),
        slug: Set(format!("{slug}-default")),
        color: Set("black".into()),
        price_in_cents: Set(price_in_cents),
        image_url: Set(format!("https://cdn.test/{slug}.jpg")),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    Ok(variant.id)
}
