//! Test utilities for paisa-core
//!
//! Provides a stub model server that speaks both upstream dialects: the
//! Gemini `generateContent` endpoint and the extraction proxy's
//! `/api/extract` envelope. Responses are keyed off the request text, so
//! tests can drive the success and failure branches of the HTTP clients
//! without any real backend.

use axum::{
    extract::Json,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::sync::oneshot;

use crate::ai::ExtractRequestBody;

/// Stub upstream for extraction client tests
pub struct StubModelServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl StubModelServer {
    /// Start the stub on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/v1beta/models/:model", post(handle_generate))
            .route("/api/extract", post(handle_extract))
            .route("/api/health", get(handle_health));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL of this stub
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the stub server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for StubModelServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One fixed candidate, JSON-shaped like real model output
fn coffee_expense() -> Value {
    json!({
        "date": "2025-11-04",
        "item": "coffee",
        "price": 150.0,
        "category": "Food",
        "type": "expense"
    })
}

/// Gemini `generateContent` endpoint
///
/// "overloaded" in the user text triggers a non-2xx upstream error,
/// "nothing" an empty candidate list; everything else returns one expense.
async fn handle_generate(Json(request): Json<Value>) -> Response {
    let prompt = request["contents"][0]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    if prompt.contains("overloaded") {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": {"message": "The model is overloaded"}})),
        )
            .into_response();
    }

    let expenses = if prompt.contains("nothing") {
        json!([])
    } else {
        json!([coffee_expense()])
    };

    Json(json!({
        "candidates": [{
            "content": {
                "parts": [{"text": expenses.to_string()}],
                "role": "model"
            }
        }]
    }))
    .into_response()
}

/// Extraction proxy endpoint with the `{ "expenses": [...] }` envelope
///
/// "offline" in the notes returns 502, "nothing" returns the 422 error
/// envelope a candidate-free extraction produces.
async fn handle_extract(Json(body): Json<ExtractRequestBody>) -> Response {
    if body.raw_text.contains("offline") {
        return (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": "The model backend is offline"})),
        )
            .into_response();
    }
    if body.raw_text.contains("nothing") {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": "No transactions found in the notes"})),
        )
            .into_response();
    }
    Json(json!({"expenses": [coffee_expense()]})).into_response()
}

async fn handle_health() -> Json<Value> {
    Json(json!({"status": "ok", "upstream": true}))
}
