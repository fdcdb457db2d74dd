// =============================================================================
// Analysis Configuration — immutable engine parameters loaded once at startup
// =============================================================================
//
// Moving-average and RSI periods come from the environment (MA_SHORT_PERIOD,
// MA_MEDIUM_PERIOD, MA_LONG_PERIOD, RSI_PERIOD) with the standard defaults
// 5/20/60/14. The remaining indicator parameters are fixed. The struct is
// built once in main and shared read-only for the life of the process — there
// is no hot reload and no hidden module-level state.
// =============================================================================

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

fn default_ma_short() -> usize {
    5
}

fn default_ma_medium() -> usize {
    20
}

fn default_ma_long() -> usize {
    60
}

fn default_rsi_period() -> usize {
    14
}

fn default_bollinger_period() -> usize {
    20
}

fn default_bollinger_std() -> f64 {
    2.0
}

fn default_volume_ma_period() -> usize {
    20
}

fn default_atr_period() -> usize {
    14
}

fn default_roc_period() -> usize {
    10
}

/// Indicator parameters for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Short EMA period (default 5).
    #[serde(default = "default_ma_short")]
    pub ma_short: usize,

    /// Medium EMA period (default 20).
    #[serde(default = "default_ma_medium")]
    pub ma_medium: usize,

    /// Long EMA period (default 60).
    #[serde(default = "default_ma_long")]
    pub ma_long: usize,

    /// RSI look-back period (default 14).
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Bollinger Band window (fixed default 20).
    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,

    /// Bollinger Band width in standard deviations (fixed default 2.0).
    #[serde(default = "default_bollinger_std")]
    pub bollinger_std: f64,

    /// Volume moving-average window (fixed default 20).
    #[serde(default = "default_volume_ma_period")]
    pub volume_ma_period: usize,

    /// ATR look-back period (fixed default 14).
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    /// Rate-of-change look-back (fixed default 10).
    #[serde(default = "default_roc_period")]
    pub roc_period: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ma_short: default_ma_short(),
            ma_medium: default_ma_medium(),
            ma_long: default_ma_long(),
            rsi_period: default_rsi_period(),
            bollinger_period: default_bollinger_period(),
            bollinger_std: default_bollinger_std(),
            volume_ma_period: default_volume_ma_period(),
            atr_period: default_atr_period(),
            roc_period: default_roc_period(),
        }
    }
}

impl AnalysisConfig {
    /// Build the configuration from environment variables, falling back to
    /// the defaults for anything unset. Fails on unparseable or non-positive
    /// periods rather than silently misconfiguring the engine.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.ma_short = env_period("MA_SHORT_PERIOD", config.ma_short)?;
        config.ma_medium = env_period("MA_MEDIUM_PERIOD", config.ma_medium)?;
        config.ma_long = env_period("MA_LONG_PERIOD", config.ma_long)?;
        config.rsi_period = env_period("RSI_PERIOD", config.rsi_period)?;

        config.validate()?;

        info!(
            ma_short = config.ma_short,
            ma_medium = config.ma_medium,
            ma_long = config.ma_long,
            rsi_period = config.rsi_period,
            "analysis config loaded"
        );

        Ok(config)
    }

    /// All periods must be positive integers.
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("ma_short", self.ma_short),
            ("ma_medium", self.ma_medium),
            ("ma_long", self.ma_long),
            ("rsi_period", self.rsi_period),
            ("bollinger_period", self.bollinger_period),
            ("volume_ma_period", self.volume_ma_period),
            ("atr_period", self.atr_period),
            ("roc_period", self.roc_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                bail!("{name} must be a positive integer");
            }
        }
        if self.bollinger_std <= 0.0 || !self.bollinger_std.is_finite() {
            bail!("bollinger_std must be a positive finite number");
        }
        Ok(())
    }
}

/// Read a period from the environment, keeping `fallback` when unset.
fn env_period(var: &str, fallback: usize) -> Result<usize> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("{var} must be an integer, got '{raw}'")),
        Err(_) => Ok(fallback),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_periods() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.ma_short, 5);
        assert_eq!(cfg.ma_medium, 20);
        assert_eq!(cfg.ma_long, 60);
        assert_eq!(cfg.rsi_period, 14);
        assert_eq!(cfg.bollinger_period, 20);
        assert!((cfg.bollinger_std - 2.0).abs() < f64::EPSILON);
        assert_eq!(cfg.volume_ma_period, 20);
        assert_eq!(cfg.atr_period, 14);
        assert_eq!(cfg.roc_period, 10);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.ma_short, 5);
        assert_eq!(cfg.rsi_period, 14);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let cfg: AnalysisConfig =
            serde_json::from_str(r#"{ "ma_short": 8, "rsi_period": 21 }"#).unwrap();
        assert_eq!(cfg.ma_short, 8);
        assert_eq!(cfg.rsi_period, 21);
        assert_eq!(cfg.ma_long, 60);
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut cfg = AnalysisConfig::default();
        cfg.rsi_period = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn non_finite_bollinger_std_is_rejected() {
        let mut cfg = AnalysisConfig::default();
        cfg.bollinger_std = f64::NAN;
        assert!(cfg.validate().is_err());
    }
}
