//! Client for the server-side extraction proxy
//!
//! The proxy holds the real model credential; this client only ever sends
//! the user's notes and the knowledge directives to `POST /api/extract` and
//! reads back the `{ "expenses": [...] }` envelope. Failures come back as
//! non-2xx with an `{ "error": "..." }` body.

use reqwest::Client;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::CandidateRecord;

use super::types::{ErrorBody, ExtractRequestBody, ExtractResponseBody, ExtractionRequest};

#[derive(Clone)]
pub struct GatewayClient {
    http_client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Requires `PAISA_GATEWAY_URL`
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("PAISA_GATEWAY_URL").ok()?;
        Some(Self::new(&url))
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }

    pub async fn extract(&self, request: &ExtractionRequest) -> Result<Vec<CandidateRecord>> {
        request.validate()?;

        let body = ExtractRequestBody {
            raw_text: request.raw_text.clone(),
            images: request.images.clone(),
            knowledge: request.knowledge.clone(),
        };
        let response = self
            .http_client
            .post(format!("{}/api/extract", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("status {}", status));
            return Err(Error::Gateway(message));
        }

        let envelope: ExtractResponseBody = response.json().await?;
        debug!(count = envelope.expenses.len(), "Gateway returned candidates");
        if envelope.expenses.is_empty() {
            return Err(Error::NoTransactions);
        }
        Ok(envelope.expenses)
    }

    pub async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}
