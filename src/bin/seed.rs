use chrono::Duration;
use secrecy::ExposeSecret;
use storefront_checkout::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    middleware::auth::issue_token,
};
use uuid::Uuid;

struct SeedVariant {
    name: &'static str,
    slug: &'static str,
    color: &'static str,
    price_in_cents: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let user_id = ensure_user(&pool, "buyer@example.com", "Dev Buyer").await?;

    seed_product(
        &pool,
        "Classic Tee",
        "classic-tee",
        "Heavyweight cotton t-shirt",
        &[
            SeedVariant { name: "White", slug: "classic-tee-white", color: "white", price_in_cents: 1000 },
            SeedVariant { name: "Black", slug: "classic-tee-black", color: "black", price_in_cents: 1000 },
        ],
    )
    .await?;
    seed_product(
        &pool,
        "Canvas Sneaker",
        "canvas-sneaker",
        "Low-top canvas sneaker",
        &[SeedVariant { name: "Navy", slug: "canvas-sneaker-navy", color: "navy", price_in_cents: 2500 }],
    )
    .await?;

    let token = issue_token(user_id, config.jwt_secret.expose_secret(), Duration::days(7))?;
    println!("Seed completed. User ID: {user_id}");
    println!("Dev bearer token (7 days): {token}");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, name: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email}");
    Ok(id)
}

async fn seed_product(
    pool: &sqlx::PgPool,
    name: &str,
    slug: &str,
    description: &str,
    variants: &[SeedVariant],
) -> anyhow::Result<()> {
    let (product_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO products (id, name, slug, description)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slug)
    .bind(description)
    .fetch_one(pool)
    .await?;

    for variant in variants {
        sqlx::query(
            r#"
            INSERT INTO product_variants (id, product_id, name, slug, color, price_in_cents, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(variant.name)
        .bind(variant.slug)
        .bind(variant.color)
        .bind(variant.price_in_cents)
        .bind(format!("https://cdn.example.com/{}.jpg", variant.slug))
        .execute(pool)
        .await?;
        println!("Ensured variant {}", variant.slug);
    }
    Ok(())
}
