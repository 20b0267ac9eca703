use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::job::{Job, JobLineItem, JobListParams, LineItemInput};
use crate::models::status::JobStatus;

const JOB_COLUMNS: &str = "id, client_id, title, description, status, scheduled_at, \
     duration_minutes, address, latitude, longitude, total_cents, created_at, updated_at";

/// Insert a new job in `quote` status together with its line items.
pub async fn create_job(
    pool: &PgPool,
    client_id: Uuid,
    title: &str,
    description: Option<&str>,
    address: Option<&str>,
    duration_minutes: Option<i32>,
    line_items: &[LineItemInput],
) -> Result<Job, sqlx::Error> {
    let total_cents: i64 = line_items
        .iter()
        .map(|li| (li.quantity * li.unit_price_cents as f64).round() as i64)
        .sum();

    let mut tx = pool.begin().await?;

    let job: Job = sqlx::query_as(&format!(
        r#"
        INSERT INTO jobs (client_id, title, description, status, address, duration_minutes, total_cents)
        VALUES ($1, $2, $3, 'quote', $4, $5, $6)
        RETURNING {JOB_COLUMNS}
        "#,
    ))
    .bind(client_id)
    .bind(title)
    .bind(description)
    .bind(address)
    .bind(duration_minutes)
    .bind(total_cents)
    .fetch_one(&mut *tx)
    .await?;

    for item in line_items {
        sqlx::query(
            r#"
            INSERT INTO job_line_items (job_id, description, quantity, unit_price_cents)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(job.id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(job)
}

/// Get a job by ID
pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<Option<Job>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_line_items(pool: &PgPool, job_id: Uuid) -> Result<Vec<JobLineItem>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, job_id, description, quantity, unit_price_cents
        FROM job_line_items
        WHERE job_id = $1
        ORDER BY id
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await
}

/// List jobs with an optional status filter, ordered by a timestamp column.
/// Unknown order fields fall back to `created_at` descending rather than
/// reaching the database, since column names cannot be bound parameters.
pub async fn list_jobs(pool: &PgPool, params: &JobListParams) -> Result<Vec<Job>, sqlx::Error> {
    let order_by = match params.order_by.as_deref() {
        Some("scheduled_at") => "scheduled_at",
        _ => "created_at",
    };
    let order = match params.order.as_deref() {
        Some("asc") => "ASC",
        _ => "DESC",
    };

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM jobs"));
    if let Some(status) = &params.status {
        builder.push(" WHERE status = ").push_bind(status);
    }
    builder.push(format!(" ORDER BY {order_by} {order} LIMIT 500"));

    builder.build_query_as().fetch_all(pool).await
}

/// Update job status. The caller is responsible for checking the transition
/// against the status policy first.
pub async fn update_job_status(
    pool: &PgPool,
    job_id: Uuid,
    status: JobStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE jobs
        SET status = $1, updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(status.to_string())
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Write a schedule timestamp and the status derived for it in one update,
/// so a job never carries a schedule date with a stale status.
pub async fn schedule_job(
    pool: &PgPool,
    job_id: Uuid,
    scheduled_at: DateTime<Utc>,
    status: JobStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE jobs
        SET scheduled_at = $1, status = $2, updated_at = NOW()
        WHERE id = $3
        "#,
    )
    .bind(scheduled_at)
    .bind(status.to_string())
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Store geocoded coordinates for a job's address.
pub async fn set_job_coordinates(
    pool: &PgPool,
    job_id: Uuid,
    latitude: f64,
    longitude: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE jobs
        SET latitude = $1, longitude = $2, updated_at = NOW()
        WHERE id = $3
        "#,
    )
    .bind(latitude)
    .bind(longitude)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}
