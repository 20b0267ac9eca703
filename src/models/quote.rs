use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pricing proposal. An approved quote is converted into a job by a
/// separate server-side operation; this service only manages the quote's
/// own lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Quote {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub status: String,
    pub total_cents: i64,
    pub sent_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuoteLineItem {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub description: String,
    pub quantity: f64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuoteRequest {
    #[garde(skip)]
    pub client_id: Uuid,

    #[garde(length(min = 1, max = 200))]
    pub title: String,

    #[garde(dive)]
    #[serde(default)]
    pub line_items: Vec<super::job::LineItemInput>,
}

/// Body of `PATCH /api/v1/quotes/{id}/status`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuoteStatusRequest {
    #[garde(length(min = 1, max = 50))]
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteListParams {
    pub status: Option<String>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: Quote,
    pub line_items: Vec<QuoteLineItem>,
}
