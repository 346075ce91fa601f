use axum::{extract::FromRequestParts, http::header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

/// Authenticated caller, derived from the session token and nothing else.
///
/// Every core operation takes this explicitly; client-supplied user ids are
/// never trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Decode a bearer token issued by the identity provider.
pub fn verify_token(token: &str, secret: &str) -> Result<AuthContext, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;
    Ok(AuthContext { user_id })
}

/// Mint a session token; stands in for the identity provider in dev tooling and tests.
pub fn issue_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_str = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        verify_token(token, state.config.jwt_secret.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "secret", Duration::hours(1)).expect("token");
        let ctx = verify_token(&token, "secret").expect("valid");
        assert_eq!(ctx.user_id, user_id);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = issue_token(Uuid::new_v4(), "secret", Duration::hours(1)).expect("token");
        assert!(matches!(
            verify_token(&token, "other"),
            Err(AppError::Unauthorized)
        ));
    }
}
