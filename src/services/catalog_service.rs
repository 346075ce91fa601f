use crate::{
    error::{AppError, AppResult},
    models::ProductVariant,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_variant(state: &AppState, slug: &str) -> AppResult<ApiResponse<ProductVariant>> {
    let variant = state
        .catalog
        .find_variant_by_slug(slug)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Ok", variant, Some(Meta::empty())))
}
