// =============================================================================
// Trailing rolling-window statistics
// =============================================================================
//
// Shared by the RSI, Bollinger, volume and ATR computations. Windows are
// strictly trailing (causal): the value at index i covers [i-w+1, i] and is
// `None` until a full window of history exists. Output is always
// index-aligned with the input.

/// Trailing rolling mean over `window` values.
///
/// `out[i]` is `Some(mean)` for `i >= window - 1`, `None` inside the warm-up
/// prefix. A zero window yields all `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);

    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out[i] = Some(sum / window as f64);
    }
    out
}

/// Trailing rolling sample standard deviation over `window` values.
///
/// Computed per-window from the window mean with one delta degree of
/// freedom (variance divides by `window - 1`). Warm-up positions are
/// `None`; a window below 2 has no sample variance and yields all `None`.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window < 2 || values.len() < window {
        return out;
    }

    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance =
            slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        out[i] = Some(variance.sqrt());
    }
    out
}
