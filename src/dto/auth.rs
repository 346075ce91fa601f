use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Session token claims; `sub` is the user id.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}
