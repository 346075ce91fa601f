use std::env;

use anyhow::Context;
use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Shared with the identity provider that issues session tokens.
    pub jwt_secret: SecretString,
    /// Public storefront origin, used to build gateway redirect URLs.
    pub app_url: String,
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub api_base: String,
    pub secret_key: SecretString,
    pub webhook_secret: SecretString,
    pub currency: String,
    pub webhook_tolerance_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let app_url = env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret: SecretString::from(jwt_secret),
            app_url: app_url.trim_end_matches('/').to_string(),
            payment: PaymentConfig::from_env()?,
        })
    }

    pub fn success_url(&self) -> String {
        format!("{}/checkout/success", self.app_url)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/checkout/cancel", self.app_url)
    }
}

impl PaymentConfig {
    pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

    pub fn from_env() -> anyhow::Result<Self> {
        let secret_key =
            env::var("PAYMENT_SECRET_KEY").context("PAYMENT_SECRET_KEY is not set")?;
        let webhook_secret =
            env::var("PAYMENT_WEBHOOK_SECRET").context("PAYMENT_WEBHOOK_SECRET is not set")?;
        let api_base = env::var("PAYMENT_API_BASE")
            .unwrap_or_else(|_| "https://api.stripe.com".to_string());
        let currency = env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "brl".to_string());
        let webhook_tolerance_secs = env::var("PAYMENT_WEBHOOK_TOLERANCE_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(Self::DEFAULT_TOLERANCE_SECS);

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: SecretString::from(secret_key),
            webhook_secret: SecretString::from(webhook_secret),
            currency: currency.to_lowercase(),
            webhook_tolerance_secs,
        })
    }
}
