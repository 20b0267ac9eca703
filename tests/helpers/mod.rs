//! Helpers for E2E testing against a running fieldops server.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response shape shared by client endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Response shape shared by job endpoints (flattened job record).
#[derive(Debug, Serialize, Deserialize)]
pub struct JobBody {
    pub id: Uuid,
    pub client_id: Uuid,
    pub status: String,
    pub scheduled_at: Option<String>,
}

/// Response from POST /api/v1/jobs/{id}/schedule
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleBody {
    pub job_id: Uuid,
    pub status: String,
    pub scheduled_at: String,
}

/// Base URL from env or default.
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
