// Axum API Server Module
//
// Purpose: HTTP surface for the pot calculator form
//   - selector options and calculations as JSON
//   - the form page itself as static files
// All requests share one ReferenceData, so each dataset is read from disk once.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use moka::future::Cache;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::calculator::Calculator;
use crate::config::ServerConfig;
use crate::data::{ReferenceData, Selection};
use crate::error::FetchError;
use crate::presentation::{OutputPanel, SelectorOptions};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<Calculator>,
    /// Rendered calculate responses keyed by selection
    pub cache: Cache<String, serde_json::Value>,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    /// State backed by `config.data_dir`, with both datasets loaded up front
    ///
    /// A dataset that fails to load here is logged and fetched again on the
    /// first request that needs it.
    pub async fn new(config: &ServerConfig) -> Self {
        tracing::info!("Loading reference data from {}", config.data_dir.display());
        let data = Arc::new(ReferenceData::from_dir(&config.data_dir));

        match data.warm_up().await {
            Ok(()) => tracing::info!("Reference data loaded"),
            Err(e) => tracing::warn!("Reference data not loaded at startup: {}", e),
        }

        let mut state = Self::with_data(data, config.cache_ttl, config.cache_capacity);
        state.static_dir = Some(config.static_dir.clone());
        state
    }

    /// State over an existing store, without static file serving
    pub fn with_data(data: Arc<ReferenceData>, cache_ttl: Duration, cache_capacity: u64) -> Self {
        tracing::info!("Initializing Moka cache...");
        let cache = Cache::builder()
            .max_capacity(cache_capacity)
            .time_to_live(cache_ttl)
            .build();

        Self {
            calculator: Arc::new(Calculator::new(data)),
            cache,
            static_dir: None,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.static_dir.clone();

    let router = Router::new()
        // Health check
        .route("/health", get(health_check))

        // Calculator endpoints (JSON API)
        .route("/api/options", get(get_options))
        .route("/api/calculate", post(calculate));

    // The form page and its assets
    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new()) // gzip + brotli compression
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Names for the pot type, plant type and season selectors
async fn get_options(State(state): State<AppState>) -> Result<Json<SelectorOptions>, AppError> {
    let options = SelectorOptions::load(state.calculator.data()).await?;
    Ok(Json(options))
}

/// Run one calculation and return the text of every output region
async fn calculate(
    State(state): State<AppState>,
    Json(selection): Json<Selection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cache_key = format!("calculate:{:?}", selection);

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit for calculation");
        return Ok(Json(cached));
    }

    tracing::info!(
        "Calculating for {} / {} / {}",
        selection.pot_type,
        selection.plant_type,
        selection.season
    );
    let calculation = state.calculator.calculate(selection).await;

    if let Some(e) = calculation.fetch_error() {
        return Err(e.clone().into());
    }

    let panel = OutputPanel::render(&calculation);
    let result = serde_json::to_value(&panel)
        .map_err(|e| AppError::Internal(format!("Failed to serialize output: {}", e)))?;

    // Lookup failures are not cached
    if calculation.is_complete() {
        state.cache.insert(cache_key, result.clone()).await;
    }

    Ok(Json(result))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Unavailable(String),
    Internal(String),
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::Unavailable(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
