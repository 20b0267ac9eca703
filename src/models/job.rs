use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::JobStatus;

/// A unit of field work with a lifecycle status, optional schedule and
/// billable line items.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Stored as the raw wire string; legacy rows may hold values outside
    /// the current enum, which the status policy treats as invalid.
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A billable line on a job.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobLineItem {
    pub id: Uuid,
    pub job_id: Uuid,
    pub description: String,
    pub quantity: f64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[garde(skip)]
    pub client_id: Uuid,

    #[garde(length(min = 1, max = 200))]
    pub title: String,

    #[garde(length(max = 2000))]
    pub description: Option<String>,

    #[garde(length(min = 1, max = 500))]
    pub address: Option<String>,

    #[garde(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,

    #[garde(dive)]
    #[serde(default)]
    pub line_items: Vec<LineItemInput>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LineItemInput {
    #[garde(length(min = 1, max = 500))]
    pub description: String,

    #[garde(range(min = 0.0, max = 100_000.0))]
    pub quantity: f64,

    #[garde(range(min = 0, max = 100_000_000))]
    pub unit_price_cents: i64,
}

/// Body of `PATCH /api/v1/jobs/{id}/status`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateJobStatusRequest {
    #[garde(length(min = 1, max = 50))]
    pub status: String,
}

/// Body of `POST /api/v1/jobs/{id}/schedule`.
#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleJobRequest {
    #[garde(skip)]
    pub scheduled_at: DateTime<Utc>,
}

/// Query parameters for job listing.
#[derive(Debug, Default, Deserialize)]
pub struct JobListParams {
    pub status: Option<String>,
    /// `scheduled_at` or `created_at` (default).
    pub order_by: Option<String>,
    /// `asc` or `desc` (default).
    pub order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    #[serde(flatten)]
    pub job: Job,
    pub line_items: Vec<JobLineItem>,
}

/// Response after a schedule write, echoing the status the policy derived.
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub job_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub status: JobStatus,
}
