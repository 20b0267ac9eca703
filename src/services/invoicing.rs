//! Client for the external e-invoicing document API.
//!
//! The provider uses short-lived bearer tokens obtained by exchanging
//! client credentials; the token is cached until shortly before expiry.
//! Only draft creation is implemented here — issuing and delivery happen
//! in the provider's own dashboard.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Renew the token this long before the provider's stated expiry.
const TOKEN_RENEWAL_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum InvoicingError {
    #[error("invoicing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token exchange rejected: {0}")]
    TokenExchange(String),
}

#[derive(Debug, Serialize)]
pub struct DraftInvoice {
    pub external_reference: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub lines: Vec<DraftInvoiceLine>,
}

#[derive(Debug, Serialize)]
pub struct DraftInvoiceLine {
    pub description: String,
    pub quantity: f64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DraftInvoiceDocument {
    pub document_id: String,
    pub status: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    obtained_at: Instant,
    lifetime: Duration,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.obtained_at.elapsed() + TOKEN_RENEWAL_MARGIN < self.lifetime
    }
}

pub struct InvoicingClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    token: RwLock<Option<CachedToken>>,
}

impl InvoicingClient {
    pub fn new(
        base_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, InvoicingError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fieldops/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token: RwLock::new(None),
        })
    }

    /// Create a draft invoice document for a completed job.
    pub async fn create_draft(
        &self,
        draft: &DraftInvoice,
    ) -> Result<DraftInvoiceDocument, InvoicingError> {
        let token = self.access_token().await?;
        let document: DraftInvoiceDocument = self
            .http
            .post(format!("{}/v2/documents", self.base_url))
            .bearer_auth(&token)
            .json(draft)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        metrics::counter!("invoice_drafts_created_total").increment(1);
        Ok(document)
    }

    async fn access_token(&self) -> Result<String, InvoicingError> {
        {
            let cached = self.token.read().await;
            if let Some(t) = cached.as_ref().filter(|t| t.is_fresh()) {
                return Ok(t.token.clone());
            }
        }

        let response = self
            .http
            .post(format!("{}/oauth/token", self.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InvoicingError::TokenExchange(format!("{status}: {body}")));
        }

        let token: TokenResponse = response.json().await?;
        let mut cached = self.token.write().await;
        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            obtained_at: Instant::now(),
            lifetime: Duration::from_secs(token.expires_in),
        });
        Ok(token.access_token)
    }
}
