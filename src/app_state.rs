use sqlx::PgPool;
use std::sync::Arc;

use crate::services::{
    geocode::GeocodeClient,
    invoicing::InvoicingClient,
    routing::RoutingClient,
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub geocoder: Arc<GeocodeClient>,
    pub router: Arc<RoutingClient>,
    pub invoicing: Arc<InvoicingClient>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        geocoder: GeocodeClient,
        router: RoutingClient,
        invoicing: InvoicingClient,
    ) -> Self {
        Self {
            db,
            geocoder: Arc::new(geocoder),
            router: Arc::new(router),
            invoicing: Arc::new(invoicing),
        }
    }
}
