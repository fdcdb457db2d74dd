// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Four routes. The banner and health endpoints are public; the browser test
// endpoint accepts a `?token=` query parameter or a Bearer header; the JSON
// analysis endpoint requires a Bearer token via the `AuthBearer` extractor.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::analyzer::AnalysisRequest;
use crate::api::auth::{validate_token, AuthBearer};
use crate::api::response::{ApiError, ApiSuccess};
use crate::app_state::AppState;
use crate::types::Market;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Public ──────────────────────────────────────────────────
        .route("/", get(banner))
        .route("/health", get(health))
        // ── Authenticated ───────────────────────────────────────────
        .route("/test-stock/:code", get(test_stock))
        .route("/analyze-stock", post(analyze_stock))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Banner (public)
// =============================================================================

async fn banner() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "stockscope",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /health",
            "test_stock": "GET /test-stock/{code}?market=A&token=<token>",
            "analyze_stock": "POST /analyze-stock (Bearer token)",
        },
    }))
}

// =============================================================================
// Health (public)
// =============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "server_time": chrono::Utc::now().timestamp_millis(),
    }))
}

// =============================================================================
// Browser test endpoint (query token or Bearer header)
// =============================================================================

#[derive(Debug, Deserialize)]
struct TestStockQuery {
    #[serde(default)]
    market: Option<Market>,
    #[serde(default)]
    token: Option<String>,
}

/// Quick manual check from a browser address bar. Auth accepts either a
/// `?token=` query parameter or the usual Bearer header, and the response is
/// the bare report object rather than the full analysis payload.
async fn test_stock(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(query): Query<TestStockQuery>,
    headers: HeaderMap,
) -> Response {
    if !test_stock_authorized(&query, &headers) {
        warn!(code, "unauthenticated test-stock request rejected");
        return ApiError::new(
            StatusCode::UNAUTHORIZED,
            "AUTHENTICATION_ERROR",
            "Missing or invalid token",
        )
        .into_response();
    }

    let request = AnalysisRequest {
        stock_code: code,
        market_type: query.market.unwrap_or_default(),
        start_date: None,
        end_date: None,
    };

    match state.analyzer.analyze(&request).await {
        Ok(output) => ApiSuccess::new(output.report).into_response(),
        Err(e) => ApiError::from_analysis(&e).into_response(),
    }
}

fn test_stock_authorized(query: &TestStockQuery, headers: &HeaderMap) -> bool {
    if let Some(token) = query.token.as_deref() {
        return validate_token(token);
    }
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(validate_token)
}

// =============================================================================
// Analysis endpoint (authenticated)
// =============================================================================

async fn analyze_stock(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Response {
    info!(code = request.stock_code, market = %request.market_type, "analyze request");
    match state.analyzer.analyze(&request).await {
        Ok(output) => ApiSuccess::new(output).into_response(),
        Err(e) => ApiError::from_analysis(&e).into_response(),
    }
}
