//! Paisa extraction proxy
//!
//! Axum server standing between clients and the upstream model. It holds the
//! real model credential; clients only ever send notes and knowledge
//! directives to `POST /api/extract` and get back the
//! `{ "expenses": [...] }` envelope. Failures are non-2xx with an
//! `{ "error": "..." }` body, so the client never sees upstream internals.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use paisa_core::ai::{ExtractRequestBody, ExtractResponseBody, ExtractionRequest, Extractor, ExtractorClient};
use paisa_core::Error as CoreError;

/// Maximum request body size (10 MB, image attachments included)
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub extractor: ExtractorClient,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    upstream: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let upstream = state.extractor.health_check().await;
    Json(HealthResponse {
        status: "ok",
        upstream,
    })
}

async fn extract(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExtractRequestBody>,
) -> Result<Json<ExtractResponseBody>, AppError> {
    let today = chrono::Local::now().date_naive();
    let mut request = ExtractionRequest::new(body.raw_text, today)
        .with_knowledge(body.knowledge);
    request.images = body.images;
    // Reject malformed requests here; extraction failures map via from_core
    request
        .validate()
        .map_err(|err| AppError::bad_request(&err.to_string()))?;

    let expenses = state.extractor.extract(&request).await.map_err(AppError::from_core)?;
    info!(count = expenses.len(), "Extraction succeeded");
    Ok(Json(ExtractResponseBody { expenses }))
}

/// Create the application router
pub fn create_router(extractor: ExtractorClient, config: ServerConfig) -> Router {
    let state = Arc::new(AppState { extractor });

    let api_routes = Router::new()
        .route("/extract", post(extract))
        .route("/health", get(health));

    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the proxy server
pub async fn serve(
    extractor: ExtractorClient,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if extractor.health_check().await {
        info!(upstream = %extractor.host(), "Extraction backend reachable");
    } else {
        warn!(upstream = %extractor.host(), "Extraction backend not responding");
    }

    let app = create_router(extractor, config);
    let addr = format!("{}:{}", host, port);
    info!("Starting extraction proxy at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// API error with a status code and a client-safe message
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }

    /// Map core errors onto HTTP statuses
    ///
    /// Validation problems are the client's fault; upstream and parsing
    /// problems are gateway failures. The message is always the error's
    /// user-facing text.
    fn from_core(err: CoreError) -> Self {
        let status = match &err {
            CoreError::InvalidInput(_) | CoreError::UnsupportedFile(_) => {
                StatusCode::BAD_REQUEST
            }
            CoreError::NoTransactions => StatusCode::UNPROCESSABLE_ENTITY,
            CoreError::Gateway(_) | CoreError::MalformedOutput(_) | CoreError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "Unexpected extraction failure");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message
        }));
        (self.status, body).into_response()
    }
}
