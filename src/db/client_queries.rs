use sqlx::PgPool;
use uuid::Uuid;

use crate::models::client::Client;

const CLIENT_COLUMNS: &str =
    "id, name, email, phone, address, latitude, longitude, created_at, updated_at";

pub async fn create_client(
    pool: &PgPool,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
    address: Option<&str>,
) -> Result<Client, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO clients (name, email, phone, address)
        VALUES ($1, $2, $3, $4)
        RETURNING {CLIENT_COLUMNS}
        "#,
    ))
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(address)
    .fetch_one(pool)
    .await
}

pub async fn get_client(pool: &PgPool, client_id: Uuid) -> Result<Option<Client>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"))
        .bind(client_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_clients(pool: &PgPool) -> Result<Vec<Client>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY name ASC LIMIT 1000"
    ))
    .fetch_all(pool)
    .await
}

/// Store geocoded coordinates for a client's address.
pub async fn set_client_coordinates(
    pool: &PgPool,
    client_id: Uuid,
    latitude: f64,
    longitude: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE clients
        SET latitude = $1, longitude = $2, updated_at = NOW()
        WHERE id = $3
        "#,
    )
    .bind(latitude)
    .bind(longitude)
    .bind(client_id)
    .execute(pool)
    .await?;

    Ok(())
}
