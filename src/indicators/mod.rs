// =============================================================================
// Indicator Engine
// =============================================================================
//
// Pure, side-effect-free computation of the full indicator set over a
// normalized price series. Every output column is index-aligned with the
// input bars; positions inside an indicator's warm-up window are `None`
// rather than an error. No minimum row count is required here — thin history
// is the scoring engine's concern.
//
// Computation order: moving averages -> RSI -> MACD -> Bollinger -> volume
// statistics -> ATR/volatility -> rate of change. ATR works from a shifted
// close and is independent of the moving-average chain.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod roc;
pub mod rolling;
pub mod rsi;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::normalize::PriceBar;

/// Derived columns extending the price table, all index-aligned with the
/// bar sequence. EMA-based columns are defined everywhere (first-value
/// seeding); windowed columns carry `None` through their warm-up.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub ma_short: Vec<f64>,
    pub ma_medium: Vec<f64>,
    pub ma_long: Vec<f64>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_hist: Vec<f64>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub volume_ma: Vec<Option<f64>>,
    pub volume_ratio: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
    pub volatility: Vec<Option<f64>>,
    pub roc: Vec<Option<f64>>,
}

/// Scalar view of one row of the indicator table.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSnapshot {
    pub ma_short: f64,
    pub ma_medium: f64,
    pub ma_long: f64,
    pub rsi: Option<f64>,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub volume_ma: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub atr: Option<f64>,
    pub volatility: Option<f64>,
    pub roc: Option<f64>,
}

impl IndicatorSet {
    /// Compute every indicator over the normalized bars.
    pub fn compute(bars: &[PriceBar], config: &AnalysisConfig) -> Self {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

        let ma_short = ema::calculate_ema(&closes, config.ma_short);
        let ma_medium = ema::calculate_ema(&closes, config.ma_medium);
        let ma_long = ema::calculate_ema(&closes, config.ma_long);

        let rsi = rsi::calculate_rsi(&closes, config.rsi_period);

        let macd_series = macd::calculate_macd(&closes);

        let bands =
            bollinger::calculate_bollinger(&closes, config.bollinger_period, config.bollinger_std);

        let volume_ma = rolling::rolling_mean(&volumes, config.volume_ma_period);
        let volume_ratio = volumes
            .iter()
            .zip(&volume_ma)
            .map(|(&v, ma)| match ma {
                Some(ma) if *ma != 0.0 => {
                    let r = v / ma;
                    r.is_finite().then_some(r)
                }
                _ => None,
            })
            .collect();

        let atr = atr::calculate_atr(bars, config.atr_period);
        let volatility = atr::volatility_pct(&atr, &closes);

        let roc = roc::calculate_roc(&closes, config.roc_period);

        Self {
            ma_short,
            ma_medium,
            ma_long,
            rsi,
            macd: macd_series.macd,
            macd_signal: macd_series.signal,
            macd_hist: macd_series.histogram,
            bb_upper: bands.upper,
            bb_middle: bands.middle,
            bb_lower: bands.lower,
            volume_ma,
            volume_ratio,
            atr,
            volatility,
            roc,
        }
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.ma_short.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ma_short.is_empty()
    }

    /// Scalar snapshot of row `i`. Panics only on out-of-range indices,
    /// which the analyzer guards against before calling.
    pub fn snapshot(&self, i: usize) -> IndicatorSnapshot {
        IndicatorSnapshot {
            ma_short: self.ma_short[i],
            ma_medium: self.ma_medium[i],
            ma_long: self.ma_long[i],
            rsi: self.rsi[i],
            macd: self.macd[i],
            macd_signal: self.macd_signal[i],
            macd_hist: self.macd_hist[i],
            bb_upper: self.bb_upper[i],
            bb_middle: self.bb_middle[i],
            bb_lower: self.bb_lower[i],
            volume_ma: self.volume_ma[i],
            volume_ratio: self.volume_ratio[i],
            atr: self.atr[i],
            volatility: self.volatility[i],
            roc: self.roc[i],
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars_from_closes(closes: &[f64], volume: f64) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume,
            })
            .collect()
    }

    #[test]
    fn all_columns_are_index_aligned() {
        let closes: Vec<f64> = (1..=80).map(|x| 100.0 + x as f64).collect();
        let bars = bars_from_closes(&closes, 1000.0);
        let set = IndicatorSet::compute(&bars, &AnalysisConfig::default());

        assert_eq!(set.len(), 80);
        assert_eq!(set.ma_medium.len(), 80);
        assert_eq!(set.rsi.len(), 80);
        assert_eq!(set.macd.len(), 80);
        assert_eq!(set.bb_upper.len(), 80);
        assert_eq!(set.volume_ratio.len(), 80);
        assert_eq!(set.atr.len(), 80);
        assert_eq!(set.volatility.len(), 80);
        assert_eq!(set.roc.len(), 80);
    }

    #[test]
    fn tiny_input_does_not_fault() {
        // No minimum row count: a 2-bar table computes, with warm-up Nones.
        let bars = bars_from_closes(&[100.0, 101.0], 500.0);
        let set = IndicatorSet::compute(&bars, &AnalysisConfig::default());
        assert_eq!(set.len(), 2);
        assert!(set.rsi[1].is_none());
        assert!(set.bb_upper[1].is_none());
        assert!(set.atr[1].is_none());
        // EMA chain is defined from bar 0.
        assert!(set.ma_long[1].is_finite());
    }

    #[test]
    fn rising_series_orders_the_ma_stack() {
        let closes: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let bars = bars_from_closes(&closes, 1000.0);
        let set = IndicatorSet::compute(&bars, &AnalysisConfig::default());

        let last = set.len() - 1;
        assert!(set.ma_short[last] > set.ma_medium[last]);
        assert!(set.ma_medium[last] > set.ma_long[last]);
        assert!(set.macd[last] > set.macd_signal[last]);
    }

    #[test]
    fn constant_series_snapshot() {
        // 25 constant bars: everything windowed is warmed up and degenerate.
        let bars = bars_from_closes(&vec![100.0; 25], 1000.0);
        let set = IndicatorSet::compute(&bars, &AnalysisConfig::default());
        let snap = set.snapshot(set.len() - 1);

        assert!((snap.ma_short - 100.0).abs() < 1e-12);
        assert!((snap.ma_medium - 100.0).abs() < 1e-12);
        assert!(snap.rsi.is_none());
        assert!(snap.macd.abs() < 1e-12);
        assert!((snap.bb_upper.unwrap() - 100.0).abs() < 1e-12);
        assert!((snap.bb_middle.unwrap() - 100.0).abs() < 1e-12);
        assert!((snap.bb_lower.unwrap() - 100.0).abs() < 1e-12);
        assert!((snap.volume_ratio.unwrap() - 1.0).abs() < 1e-12);
        assert!((snap.atr.unwrap()).abs() < 1e-12);
        assert!((snap.roc.unwrap()).abs() < 1e-12);
    }

    #[test]
    fn volume_ratio_none_when_ma_is_zero() {
        let bars = bars_from_closes(&vec![100.0; 25], 0.0);
        let set = IndicatorSet::compute(&bars, &AnalysisConfig::default());
        assert!(set.volume_ratio.iter().all(Option::is_none));
    }
}
