// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Recursive smoothing seeded with the first value of the series:
//   alpha  = 2 / (span + 1)
//   EMA_0  = x_0
//   EMA_t  = alpha * x_t + (1 - alpha) * EMA_{t-1}
//
// The output is index-aligned with the input and defined at every position —
// EMA has no warm-up window under first-value seeding.
// =============================================================================

/// Compute the EMA series for `values` with the given `span`.
///
/// Returns a vector the same length as the input (empty input or a zero span
/// yields an empty vector).
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);

    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    result.push(prev);

    for &x in &values[1..] {
        prev = alpha * x + (1.0 - alpha) * prev;
        result.push(prev);
    }

    result
}
