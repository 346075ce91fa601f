use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ShippingAddress;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAddressRequest {
    pub recipient_name: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// ISO country code, defaults to `BR`.
    pub country: Option<String>,
    pub phone: String,
    pub email: String,
    /// CPF or CNPJ, digits only or punctuated.
    pub tax_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressList {
    pub items: Vec<ShippingAddress>,
}
