use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{client_queries, job_queries};
use crate::services::invoicing::{DraftInvoice, DraftInvoiceDocument, DraftInvoiceLine};

use super::jobs::db_error;

/// POST /api/v1/jobs/{id}/invoice — create a draft invoice document at the
/// e-invoicing provider from the job's line items. The draft stays in the
/// provider's dashboard for review; nothing is issued from here.
pub async fn create_invoice(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<(StatusCode, Json<DraftInvoiceDocument>), StatusCode> {
    let job = job_queries::get_job(&state.db, job_id)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    // Only completed work gets invoiced.
    if job.status != "done" {
        tracing::info!(job_id = %job_id, status = %job.status, "refusing to invoice unfinished job");
        return Err(StatusCode::CONFLICT);
    }

    let client = client_queries::get_client(&state.db, job.client_id)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let line_items = job_queries::get_line_items(&state.db, job_id)
        .await
        .map_err(db_error)?;

    let draft = DraftInvoice {
        external_reference: job.id.to_string(),
        customer_name: client.name,
        customer_email: client.email,
        lines: line_items
            .into_iter()
            .map(|li| DraftInvoiceLine {
                description: li.description,
                quantity: li.quantity,
                unit_price_cents: li.unit_price_cents,
            })
            .collect(),
    };

    let document = state.invoicing.create_draft(&draft).await.map_err(|e| {
        tracing::error!(job_id = %job_id, error = %e, "invoice draft creation failed");
        StatusCode::BAD_GATEWAY
    })?;

    Ok((StatusCode::CREATED, Json(document)))
}
