use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::job::LineItemInput;
use crate::models::quote::{Quote, QuoteLineItem, QuoteListParams};
use crate::models::status::QuoteStatus;

const QUOTE_COLUMNS: &str =
    "id, client_id, title, status, total_cents, sent_at, decided_at, created_at, updated_at";

/// Insert a new quote in `draft` status together with its line items.
pub async fn create_quote(
    pool: &PgPool,
    client_id: Uuid,
    title: &str,
    line_items: &[LineItemInput],
) -> Result<Quote, sqlx::Error> {
    let total_cents: i64 = line_items
        .iter()
        .map(|li| (li.quantity * li.unit_price_cents as f64).round() as i64)
        .sum();

    let mut tx = pool.begin().await?;

    let quote: Quote = sqlx::query_as(&format!(
        r#"
        INSERT INTO quotes (client_id, title, status, total_cents)
        VALUES ($1, $2, 'draft', $3)
        RETURNING {QUOTE_COLUMNS}
        "#,
    ))
    .bind(client_id)
    .bind(title)
    .bind(total_cents)
    .fetch_one(&mut *tx)
    .await?;

    for item in line_items {
        sqlx::query(
            r#"
            INSERT INTO quote_line_items (quote_id, description, quantity, unit_price_cents)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(quote.id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(quote)
}

pub async fn get_quote(pool: &PgPool, quote_id: Uuid) -> Result<Option<Quote>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = $1"))
        .bind(quote_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_line_items(
    pool: &PgPool,
    quote_id: Uuid,
) -> Result<Vec<QuoteLineItem>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, quote_id, description, quantity, unit_price_cents
        FROM quote_line_items
        WHERE quote_id = $1
        ORDER BY id
        "#,
    )
    .bind(quote_id)
    .fetch_all(pool)
    .await
}

pub async fn list_quotes(
    pool: &PgPool,
    params: &QuoteListParams,
) -> Result<Vec<Quote>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE TRUE"));
    if let Some(status) = &params.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(client_id) = params.client_id {
        builder.push(" AND client_id = ").push_bind(client_id);
    }
    builder.push(" ORDER BY created_at DESC LIMIT 500");

    builder.build_query_as().fetch_all(pool).await
}

/// Update quote status, stamping `sent_at` on the first send and
/// `decided_at` when the quote reaches a decision state. The caller checks
/// the transition against the status policy first.
pub async fn update_quote_status(
    pool: &PgPool,
    quote_id: Uuid,
    status: QuoteStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE quotes
        SET status = $1,
            sent_at = CASE WHEN $1 = 'sent' AND sent_at IS NULL THEN NOW() ELSE sent_at END,
            decided_at = CASE WHEN $1 IN ('approved', 'rejected') THEN NOW() ELSE decided_at END,
            updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(status.to_string())
    .bind(quote_id)
    .execute(pool)
    .await?;

    Ok(())
}
