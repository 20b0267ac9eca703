use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::client_queries;
use crate::models::client::{Client, CreateClientRequest};

use super::jobs::db_error;

/// POST /api/v1/clients — create a client, geocoding the address
/// best-effort so map views can place the customer.
pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), StatusCode> {
    payload.validate().map_err(|_| StatusCode::BAD_REQUEST)?;

    let mut client = client_queries::create_client(
        &state.db,
        &payload.name,
        payload.email.as_deref(),
        payload.phone.as_deref(),
        payload.address.as_deref(),
    )
    .await
    .map_err(db_error)?;

    if let Some(address) = &payload.address {
        match state.geocoder.geocode(address).await {
            Ok(coords) => {
                client_queries::set_client_coordinates(
                    &state.db,
                    client.id,
                    coords.latitude,
                    coords.longitude,
                )
                .await
                .map_err(db_error)?;
                client.latitude = Some(coords.latitude);
                client.longitude = Some(coords.longitude);
            }
            Err(e) => {
                tracing::warn!(client_id = %client.id, error = %e, "could not geocode client address");
            }
        }
    }

    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /api/v1/clients
pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<Client>>, StatusCode> {
    let clients = client_queries::list_clients(&state.db)
        .await
        .map_err(db_error)?;
    Ok(Json(clients))
}

/// GET /api/v1/clients/{id}
pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Client>, StatusCode> {
    let client = client_queries::get_client(&state.db, client_id)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(client))
}
