// =============================================================================
// Moving Average Convergence / Divergence (MACD)
// =============================================================================
//
//   MACD      = EMA(close, 12) - EMA(close, 26)
//   signal    = EMA(MACD, 9)
//   histogram = MACD - signal
//
// All three series are full length: the underlying EMAs are first-value
// seeded, so there is no warm-up gap.
// =============================================================================

use crate::indicators::ema::calculate_ema;

/// Fast EMA span.
pub const MACD_FAST: usize = 12;
/// Slow EMA span.
pub const MACD_SLOW: usize = 26;
/// Signal-line EMA span.
pub const MACD_SIGNAL: usize = 9;

/// The three MACD series, index-aligned with the input closes.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute MACD, signal line and histogram for the given closes.
pub fn calculate_macd(closes: &[f64]) -> MacdSeries {
    let fast = calculate_ema(closes, MACD_FAST);
    let slow = calculate_ema(closes, MACD_SLOW);

    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = calculate_ema(&macd, MACD_SIGNAL);
    let histogram: Vec<f64> = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}
