// =============================================================================
// Average True Range (ATR) and volatility percentage
// =============================================================================
//
// True Range per bar:
//   TR_0 = high - low                      (no previous close exists)
//   TR_t = max(H - L, |H - prevC|, |L - prevC|)
//
// ATR is the trailing rolling mean of TR over `period` bars; warm-up
// positions are `None`. The series depends only on a shifted close, not on
// the moving-average chain.
//
// Volatility % = ATR / close * 100.
// =============================================================================

use crate::indicators::rolling::rolling_mean;
use crate::normalize::PriceBar;

/// Compute the ATR series, index-aligned with the bars.
pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    if bars.is_empty() {
        return Vec::new();
    }

    let mut tr = Vec::with_capacity(bars.len());
    tr.push(bars[0].high - bars[0].low);
    for i in 1..bars.len() {
        let high = bars[i].high;
        let low = bars[i].low;
        let prev_close = bars[i - 1].close;

        let hl = high - low;
        let hc = (high - prev_close).abs();
        let lc = (low - prev_close).abs();
        tr.push(hl.max(hc).max(lc));
    }

    rolling_mean(&tr, period)
}

/// Volatility as a percentage of the close: ATR / close * 100.
///
/// `None` wherever ATR is undefined or the close is zero.
pub fn volatility_pct(atr: &[Option<f64>], closes: &[f64]) -> Vec<Option<f64>> {
    atr.iter()
        .zip(closes)
        .map(|(a, &c)| match a {
            Some(a) if c != 0.0 => {
                let v = a / c * 100.0;
                v.is_finite().then_some(v)
            }
            _ => None,
        })
        .collect()
}
