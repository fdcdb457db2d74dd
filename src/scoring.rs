// =============================================================================
// Scoring Engine — composite 0-100 score and recommendation mapping
// =============================================================================
//
// Operates on the latest indicator snapshot only; no cross-row smoothing.
// Components are integral, additive and capped:
//
//   Trend  (0-30): +15 if MA-short > MA-medium; +15 if MA-medium > MA-long
//   RSI    (0-20): +20 if 30 <= RSI <= 70; +15 if RSI < 30; else 0
//                  (undefined RSI scores 0)
//   MACD   (0-20): +20 if MACD > signal
//   Volume (0-30): +30 if ratio > 1.5; +15 if 1 < ratio <= 1.5; else 0
//                  (ratio exactly 1 scores 0 — the boundary is strict;
//                   undefined ratio scores 0)
//
// Recommendation ladder (inclusive): >=80 strong buy, >=60 buy, >=40 hold,
// >=20 sell, else strong sell.
// =============================================================================

use serde::Serialize;

use crate::indicators::IndicatorSnapshot;

/// Per-component contribution to the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub trend: u32,
    pub rsi: u32,
    pub macd: u32,
    pub volume: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.trend + self.rsi + self.macd + self.volume
    }
}

/// Investment recommendation tier derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "strong buy"),
            Self::Buy => write!(f, "buy"),
            Self::Hold => write!(f, "hold"),
            Self::Sell => write!(f, "sell"),
            Self::StrongSell => write!(f, "strong sell"),
        }
    }
}

/// Score the latest indicator snapshot.
pub fn calculate_score(latest: &IndicatorSnapshot) -> ScoreBreakdown {
    let mut trend = 0;
    if latest.ma_short > latest.ma_medium {
        trend += 15;
    }
    if latest.ma_medium > latest.ma_long {
        trend += 15;
    }

    let rsi = match latest.rsi {
        Some(v) if (30.0..=70.0).contains(&v) => 20,
        Some(v) if v < 30.0 => 15, // oversold
        _ => 0,                    // overbought or undefined
    };

    let macd = if latest.macd > latest.macd_signal { 20 } else { 0 };

    let volume = match latest.volume_ratio {
        Some(r) if r > 1.5 => 30,
        Some(r) if r > 1.0 => 15,
        _ => 0,
    };

    ScoreBreakdown {
        trend,
        rsi,
        macd,
        volume,
    }
}

/// Map a composite score onto the recommendation ladder.
pub fn recommendation(score: u32) -> Recommendation {
    match score {
        80.. => Recommendation::StrongBuy,
        60..=79 => Recommendation::Buy,
        40..=59 => Recommendation::Hold,
        20..=39 => Recommendation::Sell,
        _ => Recommendation::StrongSell,
    }
}
