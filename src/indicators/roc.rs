// =============================================================================
// Rate of Change (ROC)
// =============================================================================
//
// Percentage change versus the close `period` bars back:
//   ROC_t = (close_t - close_{t-period}) / close_{t-period} * 100
//
// Warm-up positions and zero reference closes are `None`.

/// Compute the ROC series, index-aligned with the input closes.
pub fn calculate_roc(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 {
        return out;
    }

    for i in period..closes.len() {
        let reference = closes[i - period];
        if reference == 0.0 {
            continue;
        }
        let v = (closes[i] - reference) / reference * 100.0;
        if v.is_finite() {
            out[i] = Some(v);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roc_warm_up_is_none() {
        let closes: Vec<f64> = (1..=15).map(|x| x as f64).collect();
        let roc = calculate_roc(&closes, 10);
        for v in &roc[..10] {
            assert!(v.is_none());
        }
        // From 1 to 11: (11 - 1) / 1 * 100 = 1000%.
        assert!((roc[10].unwrap() - 1000.0).abs() < 1e-12);
    }

    #[test]
    fn roc_flat_series_is_zero() {
        let closes = vec![50.0; 20];
        let roc = calculate_roc(&closes, 10);
        for v in roc.iter().skip(10) {
            assert!((v.unwrap()).abs() < 1e-12);
        }
    }

    #[test]
    fn roc_zero_reference_is_none() {
        let mut closes = vec![1.0; 15];
        closes[0] = 0.0;
        let roc = calculate_roc(&closes, 10);
        assert!(roc[10].is_none());
        assert!(roc[11].is_some());
    }

    #[test]
    fn roc_insufficient_data() {
        assert!(calculate_roc(&[1.0, 2.0, 3.0], 10).iter().all(Option::is_none));
    }
}
