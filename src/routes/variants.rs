use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    error::AppResult, models::ProductVariant, response::ApiResponse,
    services::catalog_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{slug}", get(get_variant))
}

/// Public catalog lookup; carts reference variants by the id returned here.
#[utoipa::path(
    get,
    path = "/api/variants/{slug}",
    params(("slug" = String, Path, description = "Variant slug")),
    security(()),
    responses(
        (status = 200, description = "Variant with its product fields", body = ApiResponse<ProductVariant>),
        (status = 404, description = "No variant with this slug"),
    ),
    tag = "Catalog"
)]
pub async fn get_variant(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ProductVariant>>> {
    let resp = catalog_service::get_variant(&state, &slug).await?;
    Ok(Json(resp))
}
