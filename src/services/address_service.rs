use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::addresses::{AddressList, CreateAddressRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthContext,
    models::ShippingAddress,
    response::{ApiResponse, Meta},
    state::AppState,
};

const DEFAULT_COUNTRY: &str = "BR";

pub async fn list_addresses(
    state: &AppState,
    ctx: &AuthContext,
) -> AppResult<ApiResponse<AddressList>> {
    let items = state.addresses.list_by_user(ctx.user_id).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", AddressList { items }, Some(meta)))
}

pub async fn create_address(
    state: &AppState,
    ctx: &AuthContext,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<ShippingAddress>> {
    let address = build_address(ctx.user_id, payload)?;
    let address = state.addresses.insert(address).await?;

    log_audit(
        state.audit.as_ref(),
        Some(ctx.user_id),
        "address_create",
        Some("shipping_addresses"),
        Some(serde_json::json!({ "address_id": address.id })),
    )
    .await;

    Ok(ApiResponse::success("Address created", address, Some(Meta::empty())))
}

pub async fn delete_address(
    state: &AppState,
    ctx: &AuthContext,
    address_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.addresses.delete_owned(ctx.user_id, address_id).await?;

    log_audit(
        state.audit.as_ref(),
        Some(ctx.user_id),
        "address_delete",
        Some("shipping_addresses"),
        Some(serde_json::json!({ "address_id": address_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Address deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Validate and normalize a new address owned by `user_id`.
pub fn build_address(user_id: Uuid, payload: CreateAddressRequest) -> AppResult<ShippingAddress> {
    let mut problems: Vec<String> = Vec::new();

    let required = [
        ("recipient_name", &payload.recipient_name),
        ("street", &payload.street),
        ("number", &payload.number),
        ("neighborhood", &payload.neighborhood),
        ("city", &payload.city),
        ("state", &payload.state),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            problems.push(format!("{field} is required"));
        }
    }

    let email = payload.email.trim();
    if !is_plausible_email(email) {
        problems.push("email is invalid".into());
    }

    let phone = digits_only(&payload.phone);
    if !(10..=11).contains(&phone.len()) {
        problems.push("phone must have 10 or 11 digits".into());
    }

    let zip_code = digits_only(&payload.zip_code);
    if zip_code.len() != 8 {
        problems.push("zip_code must have 8 digits".into());
    }

    let tax_id = digits_only(&payload.tax_id);
    if !(11..=14).contains(&tax_id.len()) {
        problems.push("tax_id must have between 11 and 14 digits".into());
    }

    if !problems.is_empty() {
        return Err(AppError::Validation(problems.join(", ")));
    }

    let country = payload
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_COUNTRY)
        .to_uppercase();

    Ok(ShippingAddress {
        id: Uuid::new_v4(),
        user_id,
        recipient_name: payload.recipient_name.trim().to_string(),
        street: payload.street.trim().to_string(),
        number: payload.number.trim().to_string(),
        complement: payload
            .complement
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        neighborhood: payload.neighborhood.trim().to_string(),
        city: payload.city.trim().to_string(),
        state: payload.state.trim().to_string(),
        zip_code,
        country,
        phone,
        email: email.to_string(),
        tax_id,
        created_at: Utc::now(),
    })
}

fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateAddressRequest {
        CreateAddressRequest {
            recipient_name: " Ana Souza ".into(),
            street: "Rua das Flores".into(),
            number: "42".into(),
            complement: Some("  ".into()),
            neighborhood: "Centro".into(),
            city: "Campinas".into(),
            state: "SP".into(),
            zip_code: "13010-000".into(),
            country: None,
            phone: "(19) 99999-0000".into(),
            email: "ana@example.com".into(),
            tax_id: "123.456.789-01".into(),
        }
    }

    #[test]
    fn normalizes_valid_address() {
        let user_id = Uuid::new_v4();
        let address = build_address(user_id, request()).expect("valid");

        assert_eq!(address.user_id, user_id);
        assert_eq!(address.recipient_name, "Ana Souza");
        assert_eq!(address.zip_code, "13010000");
        assert_eq!(address.phone, "19999990000");
        assert_eq!(address.tax_id, "12345678901");
        assert_eq!(address.country, "BR");
        assert_eq!(address.complement, None);
    }

    #[test]
    fn reports_every_invalid_field() {
        let mut payload = request();
        payload.city = String::new();
        payload.email = "not-an-email".into();
        payload.zip_code = "123".into();

        match build_address(Uuid::new_v4(), payload) {
            Err(AppError::Validation(message)) => {
                assert!(message.contains("city"));
                assert!(message.contains("email"));
                assert!(message.contains("zip_code"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
