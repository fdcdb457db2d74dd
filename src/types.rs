// =============================================================================
// Shared types — markets, instrument validation, date ranges
// =============================================================================

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Allowed leading prefixes for A-share instrument codes.
const A_SHARE_PREFIXES: [&str; 5] = ["0", "3", "6", "688", "8"];

/// Date format used throughout the request surface.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Default look-back window when no start date is supplied (days).
pub const DEFAULT_RANGE_DAYS: i64 = 365;

// =============================================================================
// Market
// =============================================================================

/// Market category an instrument belongs to. Each variant carries its own
/// provider request descriptor (see [`Market::secid`]), so adding a market
/// means adding a variant — not editing a branch chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    A,
    HK,
    US,
    ETF,
    LOF,
}

impl Default for Market {
    fn default() -> Self {
        Self::A
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::HK => write!(f, "HK"),
            Self::US => write!(f, "US"),
            Self::ETF => write!(f, "ETF"),
            Self::LOF => write!(f, "LOF"),
        }
    }
}

impl std::str::FromStr for Market {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Self::A),
            "HK" => Ok(Self::HK),
            "US" => Ok(Self::US),
            "ETF" => Ok(Self::ETF),
            "LOF" => Ok(Self::LOF),
            other => Err(AnalysisError::InvalidCode {
                code: String::new(),
                market: other.to_string(),
                reason: "unsupported market type (expected A, HK, US, ETF or LOF)".to_string(),
            }),
        }
    }
}

impl Market {
    /// Validate an instrument code for this market.
    ///
    /// A-shares must start with one of the allowed prefixes; this check runs
    /// before any network call. Other markets get the lighter caller-side
    /// check: trimmed, non-empty, length >= 3.
    pub fn validate_code(&self, code: &str) -> Result<(), AnalysisError> {
        let code = code.trim();

        match self {
            Self::A => {
                let ok = A_SHARE_PREFIXES.iter().any(|p| code.starts_with(p));
                if code.is_empty() || !ok {
                    return Err(AnalysisError::InvalidCode {
                        code: code.to_string(),
                        market: self.to_string(),
                        reason: "A-share codes must start with 0, 3, 6, 688 or 8".to_string(),
                    });
                }
                Ok(())
            }
            _ => {
                if code.len() < 3 {
                    return Err(AnalysisError::InvalidCode {
                        code: code.to_string(),
                        market: self.to_string(),
                        reason: "code must be at least 3 characters".to_string(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Eastmoney-style security id for the kline endpoint: an exchange
    /// prefix joined with the raw code. This is the per-variant entry of the
    /// provider-selection table.
    pub fn secid(&self, code: &str) -> String {
        let code = code.trim();
        match self {
            // Shanghai-listed codes (6xx stocks, 5xx funds) live on exchange 1,
            // everything else on exchange 0.
            Self::A | Self::ETF | Self::LOF => {
                let exchange = if code.starts_with('6') || code.starts_with('5') {
                    '1'
                } else {
                    '0'
                };
                format!("{exchange}.{code}")
            }
            Self::HK => format!("116.{code}"),
            Self::US => format!("105.{code}"),
        }
    }

    /// Column headers the upstream source uses for this market's rows.
    /// A-share and fund feeds carry Chinese headers; HK/US carry English.
    /// The normalizer resolves either through its alias table.
    pub fn column_names(&self) -> [&'static str; 6] {
        match self {
            Self::A | Self::ETF | Self::LOF => {
                ["日期", "开盘", "收盘", "最高", "最低", "成交量"]
            }
            Self::HK | Self::US => ["Date", "Open", "Close", "High", "Low", "Volume"],
        }
    }
}

// =============================================================================
// Date range
// =============================================================================

/// Resolved inclusive date range for a fetch, both ends as YYYYMMDD strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    /// Resolve optional start/end strings into a concrete range.
    ///
    /// Each omitted end defaults independently against today: end = today,
    /// start = 365 days before today (even when an explicit end is given).
    /// Supplied strings must be valid YYYYMMDD calendar dates.
    pub fn resolve(start: Option<&str>, end: Option<&str>) -> Result<Self, AnalysisError> {
        let today = Utc::now().date_naive();

        let end_date = match end {
            Some(s) => parse_yyyymmdd(s)?,
            None => today,
        };
        let start_date = match start {
            Some(s) => parse_yyyymmdd(s)?,
            None => today - Duration::days(DEFAULT_RANGE_DAYS),
        };

        Ok(Self {
            start: start_date.format(DATE_FORMAT).to_string(),
            end: end_date.format(DATE_FORMAT).to_string(),
        })
    }
}

/// Parse a YYYYMMDD string into a calendar date.
pub fn parse_yyyymmdd(s: &str) -> Result<NaiveDate, AnalysisError> {
    let s = s.trim();
    if s.len() != 8 {
        return Err(AnalysisError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| AnalysisError::InvalidDate(s.to_string()))
}
