use std::sync::Arc;

use crate::{
    config::AppConfig,
    payment::PaymentGateway,
    repository::{
        AddressRepository, AuditRepository, CartRepository, CatalogRepository, OrderRepository,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub addresses: Arc<dyn AddressRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire one store that backs every repository seam.
    pub fn new<S>(store: S, gateway: Arc<dyn PaymentGateway>, config: AppConfig) -> Self
    where
        S: AddressRepository
            + CartRepository
            + CatalogRepository
            + OrderRepository
            + AuditRepository
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            addresses: store.clone(),
            carts: store.clone(),
            catalog: store.clone(),
            orders: store.clone(),
            audit: store,
            gateway,
            config: Arc::new(config),
        }
    }
}
