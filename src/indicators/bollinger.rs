// =============================================================================
// Bollinger Bands
// =============================================================================
//
// middle = trailing SMA(close, period)
// upper  = middle + k * sigma
// lower  = middle - k * sigma
//
// sigma is the sample standard deviation (one delta degree of freedom) over
// the same trailing window. Warm-up positions (fewer than `period` bars of
// history) are `None`.
// =============================================================================

use crate::indicators::rolling::{rolling_mean, rolling_std};

/// The three band series, index-aligned with the input closes.
#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Compute Bollinger Bands over `closes` with the given window and width.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerSeries {
    let middle = rolling_mean(closes, period);
    let std = rolling_std(closes, period);

    let upper = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m + num_std * s),
            _ => None,
        })
        .collect();
    let lower = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - num_std * s),
            _ => None,
        })
        .collect();

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_warm_up_is_none() {
        let closes: Vec<f64> = (1..=25).map(|x| x as f64).collect();
        let bb = calculate_bollinger(&closes, 20, 2.0);
        for i in 0..19 {
            assert!(bb.middle[i].is_none());
            assert!(bb.upper[i].is_none());
            assert!(bb.lower[i].is_none());
        }
        assert!(bb.middle[19].is_some());
    }

    #[test]
    fn bollinger_band_ordering() {
        let closes: Vec<f64> = (0..40).map(|x| 100.0 + (x as f64 * 0.5).sin() * 3.0).collect();
        let bb = calculate_bollinger(&closes, 20, 2.0);
        for i in 19..closes.len() {
            let (u, m, l) = (
                bb.upper[i].unwrap(),
                bb.middle[i].unwrap(),
                bb.lower[i].unwrap(),
            );
            assert!(u >= m && m >= l, "band order violated at {i}");
        }
    }

    #[test]
    fn bollinger_known_sample_std_bands() {
        // Closes 1..=20, window 20: middle = 10.5, sample sigma = sqrt(35).
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let bb = calculate_bollinger(&closes, 20, 2.0);
        let sigma = 35.0_f64.sqrt();
        assert!((bb.middle[19].unwrap() - 10.5).abs() < 1e-12);
        assert!((bb.upper[19].unwrap() - (10.5 + 2.0 * sigma)).abs() < 1e-12);
        assert!((bb.lower[19].unwrap() - (10.5 - 2.0 * sigma)).abs() < 1e-12);
    }

    #[test]
    fn bollinger_flat_series_collapses_to_close() {
        // Constant input: sigma = 0, so all three bands equal the close.
        let closes = vec![100.0; 25];
        let bb = calculate_bollinger(&closes, 20, 2.0);
        for i in 19..25 {
            assert!((bb.upper[i].unwrap() - 100.0).abs() < 1e-12);
            assert!((bb.middle[i].unwrap() - 100.0).abs() < 1e-12);
            assert!((bb.lower[i].unwrap() - 100.0).abs() < 1e-12);
        }
    }

    #[test]
    fn bollinger_width_scales_with_k() {
        let closes: Vec<f64> = (0..30).map(|x| 100.0 + (x % 5) as f64).collect();
        let narrow = calculate_bollinger(&closes, 20, 1.0);
        let wide = calculate_bollinger(&closes, 20, 2.0);
        let i = closes.len() - 1;
        let narrow_span = narrow.upper[i].unwrap() - narrow.lower[i].unwrap();
        let wide_span = wide.upper[i].unwrap() - wide.lower[i].unwrap();
        assert!((wide_span - 2.0 * narrow_span).abs() < 1e-9);
    }
}
