use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::quote_queries;
use crate::models::quote::{
    CreateQuoteRequest, Quote, QuoteListParams, QuoteResponse, UpdateQuoteStatusRequest,
};
use crate::models::status;

use super::jobs::db_error;

/// POST /api/v1/quotes — create a quote in `draft` status.
pub async fn create_quote(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuoteRequest>,
) -> Result<(StatusCode, Json<Quote>), StatusCode> {
    payload.validate().map_err(|_| StatusCode::BAD_REQUEST)?;

    let quote = quote_queries::create_quote(
        &state.db,
        payload.client_id,
        &payload.title,
        &payload.line_items,
    )
    .await
    .map_err(db_error)?;

    metrics::counter!("quotes_created_total").increment(1);
    Ok((StatusCode::CREATED, Json(quote)))
}

/// GET /api/v1/quotes — list quotes, optionally by status and client.
pub async fn list_quotes(
    State(state): State<AppState>,
    Query(params): Query<QuoteListParams>,
) -> Result<Json<Vec<Quote>>, StatusCode> {
    let quotes = quote_queries::list_quotes(&state.db, &params)
        .await
        .map_err(db_error)?;
    Ok(Json(quotes))
}

/// GET /api/v1/quotes/{id} — fetch a quote with its line items.
pub async fn get_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> Result<Json<QuoteResponse>, StatusCode> {
    let quote = quote_queries::get_quote(&state.db, quote_id)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;
    let line_items = quote_queries::get_line_items(&state.db, quote_id)
        .await
        .map_err(db_error)?;

    Ok(Json(QuoteResponse { quote, line_items }))
}

/// PATCH /api/v1/quotes/{id}/status — gated by the quote transition table.
///
/// Approval is terminal here; converting an approved quote into a job is a
/// separate operation and never flows back through this endpoint.
pub async fn update_quote_status(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
    Json(payload): Json<UpdateQuoteStatusRequest>,
) -> Result<Json<Quote>, StatusCode> {
    payload.validate().map_err(|_| StatusCode::BAD_REQUEST)?;

    let quote = quote_queries::get_quote(&state.db, quote_id)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    if !status::can_transition_quote_status(&quote.status, &payload.status) {
        tracing::info!(
            quote_id = %quote_id,
            from = %quote.status,
            to = %payload.status,
            "rejected quote status transition"
        );
        metrics::counter!("status_transitions_rejected_total", "entity" => "quote").increment(1);
        return Err(StatusCode::CONFLICT);
    }

    let new_status = payload
        .status
        .parse()
        .map_err(|_| StatusCode::CONFLICT)?;
    quote_queries::update_quote_status(&state.db, quote_id, new_status)
        .await
        .map_err(db_error)?;

    let updated = quote_queries::get_quote(&state.db, quote_id)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(updated))
}
