use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer record. Coordinates are filled in by the geocoding service
/// when an address is present and the provider resolves it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[garde(length(min = 1, max = 200))]
    pub name: String,

    #[garde(email)]
    pub email: Option<String>,

    #[garde(length(min = 3, max = 30))]
    pub phone: Option<String>,

    #[garde(length(min = 1, max = 500))]
    pub address: Option<String>,
}
