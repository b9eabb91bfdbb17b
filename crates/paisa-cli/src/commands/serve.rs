//! Serve command: start the extraction proxy

use anyhow::{Context, Result};

use paisa_core::ai::GeminiExtractor;
use paisa_core::ExtractorClient;
use paisa_server::{serve, ServerConfig};

pub async fn cmd_serve(host: &str, port: u16, origins: Vec<String>, mock: bool) -> Result<()> {
    let extractor = if mock {
        println!("🤖 Using the deterministic mock extractor");
        ExtractorClient::mock()
    } else {
        let gemini = GeminiExtractor::from_env()
            .context("GEMINI_API_KEY is not set; pass --mock for an offline demo")?;
        ExtractorClient::Gemini(gemini)
    };

    let config = ServerConfig {
        allowed_origins: origins,
    };
    serve(extractor, host, port, config).await
}
