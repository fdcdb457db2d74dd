// =============================================================================
// Application State
// =============================================================================
//
// The one long-lived service object: built once in main, shared by Arc into
// every request handler. Everything in here is immutable after construction
// — configuration loads once, and the analyzer's only held resource is its
// reusable HTTP client.

use crate::analyzer::StockAnalyzer;
use crate::config::AnalysisConfig;

pub struct AppState {
    pub config: AnalysisConfig,
    pub analyzer: StockAnalyzer,
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        let analyzer = StockAnalyzer::new(config.clone());
        Self { config, analyzer }
    }
}
