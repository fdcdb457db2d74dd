// =============================================================================
// Report Assembler
// =============================================================================
//
// Packages the terminal analysis value: a technical summary, the last 14
// bars with their full indicator rows, and the detailed report object. The
// result is an immutable snapshot built from the latest and previous bar —
// produced once, never mutated, and free of non-finite numerics (undefined
// indicators serialize as JSON null).
// =============================================================================

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::error::AnalysisError;
use crate::indicators::{IndicatorSet, IndicatorSnapshot};
use crate::normalize::PriceBar;
use crate::scoring::{self, Recommendation};
use crate::types::Market;

/// Number of trailing bars included in the recent-data window.
pub const RECENT_WINDOW: usize = 14;

/// High-level read of the latest indicator state.
#[derive(Debug, Clone, Serialize)]
pub struct TechnicalSummary {
    pub trend: &'static str,
    pub volatility: String,
    pub volume_trend: &'static str,
    pub rsi_level: f64,
}

/// One bar of the recent window as a flat record: price fields plus the
/// full indicator row. Undefined indicator values serialize as null.
#[derive(Debug, Clone, Serialize)]
pub struct RecentBar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    #[serde(flatten)]
    pub indicators: IndicatorSnapshot,
}

/// Scalar indicator block nested inside the report.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorBlock {
    pub ma_short: f64,
    pub ma_medium: f64,
    pub ma_long: f64,
    pub rsi: Option<f64>,
    pub macd: f64,
    pub volatility: String,
    pub volume_ratio: Option<f64>,
}

/// The detailed report object.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub stock_code: String,
    pub market_type: Market,
    pub analysis_date: String,
    pub score: u32,
    pub price: f64,
    pub price_change: f64,
    pub ma_trend: &'static str,
    pub rsi: Option<f64>,
    pub macd_signal: &'static str,
    pub volume_status: &'static str,
    pub recommendation: Recommendation,
    pub technical_indicators: IndicatorBlock,
}

/// Complete engine output handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub technical_summary: TechnicalSummary,
    pub recent_data: Vec<RecentBar>,
    pub report: Report,
}

/// Assemble the full output from the normalized bars and their indicators.
///
/// Requires at least 2 usable rows (day-over-day change needs both the
/// latest and the previous bar); thinner history is `InsufficientData`.
pub fn assemble(
    code: &str,
    market: Market,
    bars: &[PriceBar],
    indicators: &IndicatorSet,
) -> Result<AnalysisOutput, AnalysisError> {
    if bars.len() < 2 {
        return Err(AnalysisError::InsufficientData { rows: bars.len() });
    }

    let last = bars.len() - 1;
    let latest = indicators.snapshot(last);
    let latest_bar = &bars[last];
    let prev_bar = &bars[last - 1];

    let breakdown = scoring::calculate_score(&latest);
    let score = breakdown.total();

    if prev_bar.close == 0.0 {
        return Err(AnalysisError::ComputationError(format!(
            "previous close is zero on {}", prev_bar.date
        )));
    }
    let price_change = (latest_bar.close - prev_bar.close) / prev_bar.close * 100.0;
    if !price_change.is_finite() {
        return Err(AnalysisError::ComputationError(format!(
            "non-finite day-over-day change on {}", latest_bar.date
        )));
    }

    let volatility = format_volatility(latest.volatility);

    let technical_summary = TechnicalSummary {
        trend: if latest.ma_short > latest.ma_medium {
            "upward"
        } else {
            "downward"
        },
        volatility: volatility.clone(),
        volume_trend: match latest.volume_ratio {
            Some(r) if r > 1.0 => "increasing",
            _ => "decreasing",
        },
        rsi_level: latest.rsi.unwrap_or(0.0),
    };

    let start = bars.len().saturating_sub(RECENT_WINDOW);
    let recent_data = (start..bars.len())
        .map(|i| {
            let bar = &bars[i];
            RecentBar {
                date: bar.date,
                open: bar.open,
                close: bar.close,
                high: bar.high,
                low: bar.low,
                volume: bar.volume,
                indicators: indicators.snapshot(i),
            }
        })
        .collect();

    let report = Report {
        stock_code: code.to_string(),
        market_type: market,
        analysis_date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        score,
        price: latest_bar.close,
        price_change,
        ma_trend: if latest.ma_short > latest.ma_medium {
            "UP"
        } else {
            "DOWN"
        },
        rsi: latest.rsi,
        macd_signal: if latest.macd > latest.macd_signal {
            "BUY"
        } else {
            "SELL"
        },
        volume_status: match latest.volume_ratio {
            Some(r) if r > 1.5 => "HIGH",
            _ => "NORMAL",
        },
        recommendation: scoring::recommendation(score),
        technical_indicators: IndicatorBlock {
            ma_short: latest.ma_short,
            ma_medium: latest.ma_medium,
            ma_long: latest.ma_long,
            rsi: latest.rsi,
            macd: latest.macd,
            volatility,
            volume_ratio: latest.volume_ratio,
        },
    };

    Ok(AnalysisOutput {
        technical_summary,
        recent_data,
        report,
    })
}

/// Render the volatility percentage, or "n/a" when the underlying ATR is
/// still inside its warm-up window.
fn format_volatility(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}%"),
        None => "n/a".to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    fn bars(closes: &[f64], volume: f64) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: c,
                high: c * 1.01,
                low: c * 0.99,
                close: c,
                volume,
            })
            .collect()
    }

    fn assemble_closes(closes: &[f64]) -> AnalysisOutput {
        let bars = bars(closes, 1000.0);
        let set = IndicatorSet::compute(&bars, &AnalysisConfig::default());
        assemble("600519", Market::A, &bars, &set).unwrap()
    }

    #[test]
    fn fewer_than_two_rows_is_insufficient() {
        for n in [0usize, 1] {
            let closes: Vec<f64> = (0..n).map(|_| 100.0).collect();
            let b = bars(&closes, 1000.0);
            let set = IndicatorSet::compute(&b, &AnalysisConfig::default());
            let err = assemble("600519", Market::A, &b, &set).unwrap_err();
            assert_eq!(err.error_code(), "INSUFFICIENT_DATA");
        }
    }

    #[test]
    fn recent_window_is_capped_at_14() {
        let closes: Vec<f64> = (1..=60).map(|x| 100.0 + x as f64).collect();
        let out = assemble_closes(&closes);
        assert_eq!(out.recent_data.len(), RECENT_WINDOW);
        // Window is the trailing slice, ascending.
        let first = out.recent_data.first().unwrap().date;
        let last = out.recent_data.last().unwrap().date;
        assert!(first < last);
        assert!((out.recent_data.last().unwrap().close - 160.0).abs() < 1e-12);
    }

    #[test]
    fn short_history_window_is_whole_table() {
        let out = assemble_closes(&[100.0, 101.0, 102.0]);
        assert_eq!(out.recent_data.len(), 3);
    }

    #[test]
    fn uptrend_report_labels() {
        let closes: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let out = assemble_closes(&closes);
        assert_eq!(out.technical_summary.trend, "upward");
        assert_eq!(out.report.ma_trend, "UP");
        assert_eq!(out.report.macd_signal, "BUY");
        // Constant volume: ratio is exactly 1, which is not "increasing".
        assert_eq!(out.technical_summary.volume_trend, "decreasing");
        assert_eq!(out.report.volume_status, "NORMAL");
        // Day-over-day change from 99 to 100.
        assert!((out.report.price_change - (1.0 / 99.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn uptrend_trend_component_is_full() {
        let closes: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let b = bars(&closes, 1000.0);
        let set = IndicatorSet::compute(&b, &AnalysisConfig::default());
        let breakdown = crate::scoring::calculate_score(&set.snapshot(99));
        assert_eq!(breakdown.trend, 30);
        assert_eq!(breakdown.macd, 20);
        // Strictly rising closes leave RSI undefined; constant volume keeps
        // the ratio at exactly 1. Neither contributes.
        assert_eq!(breakdown.rsi, 0);
        assert_eq!(breakdown.volume, 0);

        let out = assemble_closes(&closes);
        assert_eq!(out.report.score, 50);
        assert_eq!(out.report.recommendation, Recommendation::Hold);
    }

    #[test]
    fn undefined_rsi_surfaces_as_zero_level_and_null() {
        // Strictly rising closes: zero losses, RSI undefined by design.
        let closes: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let out = assemble_closes(&closes);
        assert_eq!(out.technical_summary.rsi_level, 0.0);
        assert!(out.report.rsi.is_none());

        let json = serde_json::to_value(&out.report).unwrap();
        assert!(json["rsi"].is_null());
        assert!(json["technical_indicators"]["rsi"].is_null());
    }

    #[test]
    fn no_non_finite_numbers_in_serialized_output() {
        let closes: Vec<f64> = (1..=30).map(|x| 100.0 + (x as f64 * 0.9).sin()).collect();
        let out = assemble_closes(&closes);
        let json = serde_json::to_string(&out).unwrap();
        assert!(!json.contains("NaN"));
        assert!(!json.contains("inf"));
    }

    #[test]
    fn volatility_formatting() {
        assert_eq!(format_volatility(Some(2.345)), "2.35%");
        assert_eq!(format_volatility(None), "n/a");
    }

    #[test]
    fn zero_previous_close_is_a_computation_error() {
        let mut b = bars(&[0.0, 100.0], 1000.0);
        b[0].close = 0.0;
        let set = IndicatorSet::compute(&b, &AnalysisConfig::default());
        let err = assemble("600519", Market::A, &b, &set).unwrap_err();
        assert_eq!(err.error_code(), "COMPUTATION_ERROR");
        assert_eq!(err.sanitized_message(), "internal computation error");
    }

    #[test]
    fn constant_bars_score_zero_warmed_and_unwarmed() {
        // 25 constant bars: warmed-up degenerate case. Bollinger collapses to
        // the close, volume ratio is exactly 1 (strict > 1 scores nothing),
        // RSI undefined, MACD equals its signal, MAs equal. Total: 0.
        for n in [15usize, 25] {
            let b: Vec<PriceBar> = (0..n)
                .map(|i| PriceBar {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                        + chrono::Duration::days(i as i64),
                    open: 100.0,
                    high: 100.0,
                    low: 100.0,
                    close: 100.0,
                    volume: 1000.0,
                })
                .collect();
            let set = IndicatorSet::compute(&b, &AnalysisConfig::default());
            let out = assemble("600519", Market::A, &b, &set).unwrap();
            assert_eq!(out.report.score, 0, "n = {n}");
            assert_eq!(out.report.recommendation, Recommendation::StrongSell);
        }
    }
}
