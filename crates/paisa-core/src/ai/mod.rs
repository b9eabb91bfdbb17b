//! Extraction boundary: turning free-form notes into candidate records
//!
//! # Architecture
//!
//! - [`Extractor`] trait: one call in (notes + knowledge directives), an
//!   ordered batch of candidate records out
//! - [`ExtractorClient`] enum: concrete wrapper providing Clone and
//!   compile-time dispatch
//! - Implementations: [`GatewayClient`] (server-side proxy holding the real
//!   credential), [`GeminiExtractor`] (direct upstream, server use only),
//!   [`MockExtractor`] (deterministic, for tests)
//!
//! # Configuration
//!
//! Environment variables:
//! - `PAISA_EXTRACTOR`: Which client to use (gateway, gemini, mock).
//!   Default: gateway
//! - `PAISA_GATEWAY_URL`: Proxy base URL (required for gateway)
//! - `GEMINI_API_KEY`: Upstream credential (required for gemini)

mod gateway;
mod gemini;
mod mock;
pub mod parsing;
pub mod prompt;
mod types;

pub use gateway::GatewayClient;
pub use gemini::GeminiExtractor;
pub use mock::MockExtractor;
pub use types::{ErrorBody, ExtractRequestBody, ExtractResponseBody, ExtractionRequest, ImageAttachment};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::CandidateRecord;

/// One extraction call, side-effect-free until its own completion
///
/// Implementations never persist anything and never retry on their own;
/// retry, if any, is a caller decision.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract candidate records from the request's notes and attachments
    async fn extract(&self, request: &ExtractionRequest) -> Result<Vec<CandidateRecord>>;

    /// Whether the backing service is reachable
    async fn health_check(&self) -> bool;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete extractor enum
///
/// Provides Clone and compile-time dispatch without `Box<dyn>` overhead.
#[derive(Clone)]
pub enum ExtractorClient {
    /// Server-side proxy (the normal client path)
    Gateway(GatewayClient),
    /// Direct upstream call; only the proxy itself should hold this
    Gemini(GeminiExtractor),
    /// Deterministic extractor for tests and offline demos
    Mock(MockExtractor),
}

impl ExtractorClient {
    /// Create an extractor from environment variables
    ///
    /// Checks `PAISA_EXTRACTOR` to pick the client; returns None when the
    /// variables the chosen client needs are not set.
    pub fn from_env() -> Option<Self> {
        let which = std::env::var("PAISA_EXTRACTOR").unwrap_or_else(|_| "gateway".to_string());
        match which.to_lowercase().as_str() {
            "gateway" => GatewayClient::from_env().map(ExtractorClient::Gateway),
            "gemini" => GeminiExtractor::from_env().map(ExtractorClient::Gemini),
            "mock" => Some(ExtractorClient::Mock(MockExtractor::new())),
            other => {
                tracing::warn!(extractor = %other, "Unknown PAISA_EXTRACTOR, falling back to gateway");
                GatewayClient::from_env().map(ExtractorClient::Gateway)
            }
        }
    }

    pub fn gateway(base_url: &str) -> Self {
        ExtractorClient::Gateway(GatewayClient::new(base_url))
    }

    pub fn mock() -> Self {
        ExtractorClient::Mock(MockExtractor::new())
    }
}

#[async_trait]
impl Extractor for ExtractorClient {
    async fn extract(&self, request: &ExtractionRequest) -> Result<Vec<CandidateRecord>> {
        match self {
            ExtractorClient::Gateway(c) => c.extract(request).await,
            ExtractorClient::Gemini(c) => c.extract(request).await,
            ExtractorClient::Mock(c) => c.extract(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ExtractorClient::Gateway(c) => c.health_check().await,
            ExtractorClient::Gemini(_) => true,
            ExtractorClient::Mock(_) => true,
        }
    }

    fn host(&self) -> &str {
        match self {
            ExtractorClient::Gateway(c) => c.host(),
            ExtractorClient::Gemini(c) => c.host(),
            ExtractorClient::Mock(c) => c.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_client_reports_its_host() {
        let client = ExtractorClient::mock();
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn mock_health_check_is_always_up() {
        assert!(ExtractorClient::mock().health_check().await);
    }
}
