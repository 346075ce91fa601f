pub mod address_service;
pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod order_service;
pub mod webhook_service;
