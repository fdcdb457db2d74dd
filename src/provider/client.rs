// =============================================================================
// Market Data Client — Eastmoney-style daily kline endpoint
// =============================================================================
//
// One HTTP client, built once with a timeout and reused for every request.
// Market selection is a table on the `Market` enum (secid prefix + column
// headers); this client only executes the descriptor it is handed.
//
// Klines arrive as comma-separated strings:
//   "2024-01-02,10.20,10.55,10.60,10.11,1234567,..."
//   fields: date, open, close, high, low, volume, ...
//
// Any transport failure, non-success status, null payload or empty kline
// array maps to `DataUnavailable`. The engine never retries; that policy
// belongs to whoever calls it.
// =============================================================================

use std::sync::Once;

use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::error::AnalysisError;
use crate::normalize::RawRow;
use crate::types::{DateRange, Market};

/// Kline endpoint for daily history.
const KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";

/// Daily bars, forward-adjusted.
const KLINE_PERIOD: &str = "101";
const KLINE_ADJUST: &str = "1";

static DISABLE_PROXY: Once = Once::new();

/// Clear any ambient HTTP proxy configuration. Deployment environments can
/// inject proxies that break direct upstream access; the engine requires a
/// direct route. Runs once per process, idempotently.
fn disable_proxy() {
    DISABLE_PROXY.call_once(|| {
        std::env::set_var("NO_PROXY", "*");
        std::env::set_var("no_proxy", "*");
        for var in ["HTTP_PROXY", "HTTPS_PROXY", "http_proxy", "https_proxy"] {
            if std::env::var_os(var).is_some() {
                std::env::remove_var(var);
            }
        }
        debug!("ambient HTTP proxy configuration disabled");
    });
}

/// HTTP client for the upstream kline source.
#[derive(Clone)]
pub struct ProviderClient {
    base_url: String,
    client: reqwest::Client,
}

impl ProviderClient {
    /// Build the client. Disables ambient proxies before the underlying
    /// reqwest client is constructed.
    pub fn new() -> Self {
        Self::with_base_url(KLINE_URL)
    }

    /// Build against a non-default base URL (tests point this at a stub).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        disable_proxy();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Fetch raw daily rows for `code` on `market` over `range`.
    ///
    /// Returned rows carry the provider-native column names for the market
    /// (see [`Market::column_names`]); the normalizer maps them onto the
    /// canonical schema.
    #[instrument(skip(self), name = "provider::fetch_daily")]
    pub async fn fetch_daily(
        &self,
        code: &str,
        market: Market,
        range: &DateRange,
    ) -> Result<Vec<RawRow>, AnalysisError> {
        let secid = market.secid(code);
        let url = format!(
            "{}?secid={}&klt={}&fqt={}&beg={}&end={}&fields1=f1,f2,f3&fields2=f51,f52,f53,f54,f55,f56",
            self.base_url, secid, KLINE_PERIOD, KLINE_ADJUST, range.start, range.end
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AnalysisError::DataUnavailable(format!("kline request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AnalysisError::DataUnavailable(format!(
                "kline endpoint returned {status}"
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AnalysisError::DataUnavailable(format!("kline response unreadable: {e}")))?;

        let klines = body
            .get("data")
            .and_then(|d| d.get("klines"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AnalysisError::DataUnavailable(format!(
                    "no kline data for {code} on market {market}"
                ))
            })?;

        if klines.is_empty() {
            return Err(AnalysisError::DataUnavailable(format!(
                "empty kline data for {code} on market {market}"
            )));
        }

        let rows = parse_klines(klines, market);
        if rows.is_empty() {
            return Err(AnalysisError::DataUnavailable(format!(
                "no parseable kline rows for {code} on market {market}"
            )));
        }

        debug!(code, market = %market, count = rows.len(), "daily klines fetched");
        Ok(rows)
    }
}

impl Default for ProviderClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Split kline strings into provider-native rows. Entries with fewer than
/// six fields are skipped with a warning rather than failing the batch.
fn parse_klines(klines: &[Value], market: Market) -> Vec<RawRow> {
    let columns = market.column_names();
    let mut rows = Vec::with_capacity(klines.len());

    for entry in klines {
        let Some(line) = entry.as_str() else {
            warn!("skipping non-string kline entry");
            continue;
        };
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < columns.len() {
            warn!(fields = fields.len(), "skipping short kline entry");
            continue;
        }

        let mut row = RawRow::new();
        for (name, value) in columns.iter().zip(&fields) {
            row.insert(name.to_string(), json!(value));
        }
        rows.push(row);
    }

    rows
}
