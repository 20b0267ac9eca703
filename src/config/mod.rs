use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Primary geocoding provider base URL
    pub geocode_url: String,

    /// Primary geocoding provider API key
    pub geocode_api_key: String,

    /// Fallback geocoding provider base URL (Nominatim-compatible)
    #[serde(default = "default_geocode_fallback_url")]
    pub geocode_fallback_url: String,

    /// Routing provider base URL (OSRM-compatible)
    pub routing_url: String,

    /// E-invoicing provider base URL
    pub invoicing_url: String,

    /// E-invoicing OAuth client ID
    pub invoicing_client_id: String,

    /// E-invoicing OAuth client secret
    pub invoicing_client_secret: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_geocode_fallback_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
