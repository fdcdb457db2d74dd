// =============================================================================
// Relative Strength Index (RSI) — simple rolling-mean variant
// =============================================================================
//
// Deltas of consecutive closes are split into gains and absolute losses,
// each averaged over a trailing window of `period` deltas:
//   RS  = avg_gain / avg_loss
//   RSI = 100 - 100 / (1 + RS)
//
// This deliberately uses a plain rolling mean rather than Wilder's
// exponential smoothing; the composite score downstream depends on these
// exact values. When the trailing loss average is zero the RSI is undefined
// and reported as `None` — never an infinity leak, even when gains are
// positive.
//
// Alignment: `out[i]` covers the deltas ending at bar i. The first bar has
// no predecessor; its delta counts as zero, so the warm-up is `period - 1`
// bars and a table of exactly `period` rows already yields one value.
// =============================================================================

/// Compute the RSI series for `closes` with the given `period`.
///
/// The output is index-aligned with the input bars. `out[i]` is defined for
/// `i >= period - 1` whenever the trailing loss average is positive.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    // delta[i] = close[i] - close[i-1]; the zero-padded first entry stands
    // in for the missing predecessor of bar 0.
    let mut deltas = Vec::with_capacity(n);
    deltas.push(0.0);
    deltas.extend(closes.windows(2).map(|w| w[1] - w[0]));

    for i in (period - 1)..n {
        // Trailing `period` deltas ending at bar i.
        let window = &deltas[i + 1 - period..=i];

        let (sum_gain, sum_loss) = window.iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l + d.abs())
            }
        });

        let avg_gain = sum_gain / period as f64;
        let avg_loss = sum_loss / period as f64;

        if avg_loss == 0.0 {
            // Undefined by design: zero-loss windows have no meaningful RS.
            continue;
        }

        let rs = avg_gain / avg_loss;
        let rsi = 100.0 - 100.0 / (1.0 + rs);
        if rsi.is_finite() {
            out[i] = Some(rsi);
        }
    }

    out
}
