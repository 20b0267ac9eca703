use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::job_queries;
use crate::models::job::{
    CreateJobRequest, Job, JobListParams, JobResponse, ScheduleJobRequest, ScheduleResponse,
    UpdateJobStatusRequest,
};
use crate::models::status;

/// POST /api/v1/jobs — create a job in `quote` status.
///
/// The address is geocoded best-effort after the row exists; a geocoder
/// outage must not block job creation.
pub async fn create_job(
    State(state): State<AppState>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), StatusCode> {
    payload.validate().map_err(|e| {
        tracing::debug!(error = %e, "job payload failed validation");
        StatusCode::BAD_REQUEST
    })?;

    let job = job_queries::create_job(
        &state.db,
        payload.client_id,
        &payload.title,
        payload.description.as_deref(),
        payload.address.as_deref(),
        payload.duration_minutes,
        &payload.line_items,
    )
    .await
    .map_err(db_error)?;

    metrics::counter!("jobs_created_total").increment(1);

    let mut job = job;
    if let Some(address) = &payload.address {
        match state.geocoder.geocode(address).await {
            Ok(coords) => {
                job_queries::set_job_coordinates(
                    &state.db,
                    job.id,
                    coords.latitude,
                    coords.longitude,
                )
                .await
                .map_err(db_error)?;
                job.latitude = Some(coords.latitude);
                job.longitude = Some(coords.longitude);
            }
            Err(e) => {
                tracing::warn!(job_id = %job.id, error = %e, "could not geocode job address");
            }
        }
    }

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs — list jobs with optional status filter and ordering.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListParams>,
) -> Result<Json<Vec<Job>>, StatusCode> {
    let jobs = job_queries::list_jobs(&state.db, &params)
        .await
        .map_err(db_error)?;
    Ok(Json(jobs))
}

/// GET /api/v1/jobs/{id} — fetch a job with its line items.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobResponse>, StatusCode> {
    let job = job_queries::get_job(&state.db, job_id)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;
    let line_items = job_queries::get_line_items(&state.db, job_id)
        .await
        .map_err(db_error)?;

    Ok(Json(JobResponse { job, line_items }))
}

/// PATCH /api/v1/jobs/{id}/status — gated by the job transition table.
/// Illegal transitions (and unknown status strings on either side) are 409.
pub async fn update_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<UpdateJobStatusRequest>,
) -> Result<Json<Job>, StatusCode> {
    payload.validate().map_err(|_| StatusCode::BAD_REQUEST)?;

    let job = job_queries::get_job(&state.db, job_id)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    if !status::can_transition_job_status(&job.status, &payload.status) {
        tracing::info!(
            job_id = %job_id,
            from = %job.status,
            to = %payload.status,
            "rejected job status transition"
        );
        metrics::counter!("status_transitions_rejected_total", "entity" => "job").increment(1);
        return Err(StatusCode::CONFLICT);
    }

    // Parse cannot fail here: the policy check above validated the string.
    let new_status = payload
        .status
        .parse()
        .map_err(|_| StatusCode::CONFLICT)?;
    job_queries::update_job_status(&state.db, job_id, new_status)
        .await
        .map_err(db_error)?;

    let updated = job_queries::get_job(&state.db, job_id)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(updated))
}

/// POST /api/v1/jobs/{id}/schedule — write a schedule timestamp.
///
/// The job's new status comes from the scheduling derivation rule, the
/// single rule every schedule write path shares, whether the write came
/// from a list view, a calendar drag or a map drop.
pub async fn schedule_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<ScheduleJobRequest>,
) -> Result<Json<ScheduleResponse>, StatusCode> {
    payload.validate().map_err(|_| StatusCode::BAD_REQUEST)?;

    let job = job_queries::get_job(&state.db, job_id)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let new_status = status::status_for_scheduling(&job.status);
    job_queries::schedule_job(&state.db, job_id, payload.scheduled_at, new_status)
        .await
        .map_err(db_error)?;

    metrics::counter!("jobs_scheduled_total").increment(1);
    tracing::info!(
        job_id = %job_id,
        from = %job.status,
        to = %new_status,
        scheduled_at = %payload.scheduled_at,
        "job scheduled"
    );

    Ok(Json(ScheduleResponse {
        job_id,
        scheduled_at: payload.scheduled_at,
        status: new_status,
    }))
}

pub(crate) fn db_error(e: sqlx::Error) -> StatusCode {
    if matches!(&e, sqlx::Error::Database(db) if db.constraint().is_some()) {
        return StatusCode::BAD_REQUEST;
    }
    tracing::error!(error = %e, "database error");
    StatusCode::INTERNAL_SERVER_ERROR
}
