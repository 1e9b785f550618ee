//! HTTP API.
//!
//! ```text
//! GET  /                  map page
//! GET  /api/health        status, version, sources
//! POST /api/analyze       full citation map
//! POST /api/quick-analyze author and publications only
//! POST /api/demo          fixed sample data
//! ```

use crate::analysis::{demo_result, Analyzer};
use crate::config::Config;
use crate::error::{CiteMapError, Result};
use crate::types::{AnalysisOptions, AnalysisResult, SourceKind};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}

/// An error rendered as `{"error": message}`.
#[derive(Debug)]
pub struct AppError(StatusCode, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({"error": self.1}))).into_response()
    }
}

impl From<CiteMapError> for AppError {
    fn from(e: CiteMapError) -> Self {
        let status = match &e {
            CiteMapError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            CiteMapError::NotFound(_) => StatusCode::NOT_FOUND,
            CiteMapError::Upstream(_)
            | CiteMapError::RateLimited { .. }
            | CiteMapError::Http(_)
            | CiteMapError::Api { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", e);
        }
        let message = match e {
            CiteMapError::InvalidIdentifier(msg)
            | CiteMapError::NotFound(msg)
            | CiteMapError::Upstream(msg) => msg,
            other => other.to_string(),
        };
        AppError(status, message)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        AppError(status, rejection.body_text())
    }
}

fn bad_request(msg: impl Into<String>) -> AppError {
    AppError(StatusCode::BAD_REQUEST, msg.into())
}

// --- Request/response bodies ---

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    /// Profile URL, author id, or name.
    #[serde(default)]
    pub url: String,
    pub source: Option<String>,
    pub max_papers: Option<u32>,
    pub max_citations: Option<u32>,
    pub authors_per_paper: Option<u32>,
}

impl AnalyzeRequest {
    fn source(&self) -> std::result::Result<Option<SourceKind>, AppError> {
        match self.source.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => SourceKind::from_str_loose(name)
                .map(Some)
                .ok_or_else(|| bad_request(format!("Unknown source: {}", name))),
        }
    }

    fn options(&self) -> AnalysisOptions {
        let defaults = AnalysisOptions::default();
        AnalysisOptions {
            max_papers: self.max_papers.unwrap_or(defaults.max_papers),
            max_citations: self.max_citations.unwrap_or(defaults.max_citations),
            authors_per_paper: self.authors_per_paper.unwrap_or(defaults.authors_per_paper),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub default_source: SourceKind,
    pub sources: Vec<SourceKind>,
}

// --- Handlers ---

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_source: state.analyzer.default_source(),
        sources: state.analyzer.available_sources(),
    })
}

async fn analyze_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> std::result::Result<Json<AnalysisResult>, AppError> {
    let Json(req) = body?;
    if req.url.trim().is_empty() {
        return Err(bad_request("Please provide a profile URL or author name"));
    }
    let source = req.source()?;
    let result = state
        .analyzer
        .analyze(&req.url, source, req.options())
        .await?;
    Ok(Json(result))
}

async fn quick_analyze_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> std::result::Result<Json<AnalysisResult>, AppError> {
    let Json(req) = body?;
    if req.url.trim().is_empty() {
        return Err(bad_request("Please provide a profile URL or author name"));
    }
    let source = req.source()?;
    let result = state.analyzer.quick_analyze(&req.url, source).await?;
    Ok(Json(result))
}

async fn demo_handler() -> Json<AnalysisResult> {
    Json(demo_result())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/quick-analyze", post(quick_analyze_handler))
        .route("/api/demo", post(demo_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to `config.bind` and serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::new(config.build_analyzer()?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        "Listening on http://{} (default source: {})",
        listener.local_addr()?,
        config.default_source
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
        })
        .await?;
    Ok(())
}
