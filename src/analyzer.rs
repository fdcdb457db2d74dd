// =============================================================================
// Stock Analyzer — fetch, normalize, compute, score, assemble
// =============================================================================
//
// The long-lived engine object. Holds the immutable analysis configuration
// and a reusable provider client; every call is otherwise self-contained —
// the price table is built fresh per request and nothing is cached across
// calls, so concurrent requests cannot interfere.
//
// Failure propagates immediately as a typed `AnalysisError`; there are no
// retries around the upstream fetch.
// =============================================================================

use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::indicators::IndicatorSet;
use crate::normalize;
use crate::provider::ProviderClient;
use crate::report::{self, AnalysisOutput};
use crate::types::{DateRange, Market};

/// Engine-boundary input for one analysis call.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub stock_code: String,
    #[serde(default)]
    pub market_type: Market,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// The analysis engine. Constructed once at process start and shared
/// read-only across requests.
#[derive(Debug, Clone)]
pub struct StockAnalyzer {
    config: AnalysisConfig,
    provider: ProviderClient,
}

impl StockAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            provider: ProviderClient::new(),
        }
    }

    /// Build against a specific provider client (tests use a stubbed base
    /// URL).
    pub fn with_provider(config: AnalysisConfig, provider: ProviderClient) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the full pipeline for one request.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutput, AnalysisError> {
        let request_id = Uuid::new_v4();
        let code = request.stock_code.trim();
        let market = request.market_type;

        info!(%request_id, code, market = %market, "analysis started");
        let started = std::time::Instant::now();

        // Validation happens before any network call.
        market.validate_code(code)?;
        let range = DateRange::resolve(
            request.start_date.as_deref(),
            request.end_date.as_deref(),
        )?;

        let raw_rows = self.provider.fetch_daily(code, market, &range).await?;
        let bars = normalize::normalize(&raw_rows)?;

        let indicators = IndicatorSet::compute(&bars, &self.config);
        let output = report::assemble(code, market, &bars, &indicators).inspect_err(|e| {
            if !e.is_client_fault() {
                // Full context stays server-side; the edge sanitizes.
                error!(%request_id, code, error = %e, "analysis failed");
            }
        })?;

        info!(
            %request_id,
            code,
            score = output.report.score,
            rows = bars.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis completed"
        );
        Ok(output)
    }
}
