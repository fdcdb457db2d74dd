// =============================================================================
// Normalizer — provider rows to the canonical price table
// =============================================================================
//
// Providers disagree on column names (Chinese headers for A-share and fund
// feeds, English for HK/US) and sometimes omit an explicit date column. This
// module resolves each canonical column through an explicit ordered alias
// list — first match wins, decided once per input table — then coerces
// numerics, drops unusable rows, and sorts ascending by date.
//
// Missing date columns fall back to a synthesized daily sequence from a
// fixed epoch. That is a documented degraded-data path and is logged loudly,
// never applied silently.
// =============================================================================

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AnalysisError;

/// A raw provider row: provider-native column names mapped to JSON values.
pub type RawRow = serde_json::Map<String, Value>;

/// Epoch used when a table carries no recognizable date column.
const SYNTHETIC_EPOCH: (i32, u32, u32) = (2023, 1, 1);

/// Ordered (canonical name, accepted aliases) pairs. Alias order is the
/// resolution order; the canonical name itself is always accepted first.
const COLUMN_ALIASES: [(&str, &[&str]); 6] = [
    ("date", &["date", "Date", "日期"]),
    ("open", &["open", "Open", "开盘"]),
    ("close", &["close", "Close", "收盘"]),
    ("high", &["high", "High", "最高"]),
    ("low", &["low", "Low", "最低"]),
    ("volume", &["volume", "Volume", "成交量"]),
];

/// One canonical daily price bar. Strictly chronological and unique per date
/// after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Resolved source column name per canonical column, `None` when absent.
#[derive(Debug)]
struct ResolvedSchema {
    date: Option<String>,
    open: Option<String>,
    close: Option<String>,
    high: Option<String>,
    low: Option<String>,
    volume: Option<String>,
}

impl ResolvedSchema {
    /// Resolve the alias table against the column names present in `row`.
    fn resolve(row: &RawRow) -> Self {
        let find = |canonical: &str| -> Option<String> {
            let (_, aliases) = COLUMN_ALIASES
                .iter()
                .find(|(name, _)| *name == canonical)
                .expect("canonical column is always in the alias table");
            aliases
                .iter()
                .find(|alias| row.contains_key(**alias))
                .map(|alias| alias.to_string())
        };

        Self {
            date: find("date"),
            open: find("open"),
            close: find("close"),
            high: find("high"),
            low: find("low"),
            volume: find("volume"),
        }
    }

    /// True when not a single price column resolved — the table cannot mean
    /// anything to the engine.
    fn no_price_columns(&self) -> bool {
        self.open.is_none()
            && self.close.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.volume.is_none()
    }
}

/// Normalize raw provider rows into the canonical, chronologically sorted
/// price table.
///
/// Rows with unparseable or non-finite numerics are dropped. Fails with
/// `SchemaError` only when none of the price columns resolve via aliasing.
pub fn normalize(rows: &[RawRow]) -> Result<Vec<PriceBar>, AnalysisError> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    let schema = ResolvedSchema::resolve(first);
    if schema.no_price_columns() {
        let seen: Vec<&String> = first.keys().collect();
        return Err(AnalysisError::SchemaError(format!(
            "no price columns resolved via aliasing; saw columns {seen:?}"
        )));
    }

    let synthesize_dates = schema.date.is_none();
    if synthesize_dates {
        // Degraded-data fallback: the caller must know the dates are made up.
        warn!(
            epoch = %format!("{}-{:02}-{:02}", SYNTHETIC_EPOCH.0, SYNTHETIC_EPOCH.1, SYNTHETIC_EPOCH.2),
            "no date column resolved; synthesizing a daily sequence"
        );
    }

    let epoch = NaiveDate::from_ymd_opt(SYNTHETIC_EPOCH.0, SYNTHETIC_EPOCH.1, SYNTHETIC_EPOCH.2)
        .expect("synthetic epoch is a valid date");

    let mut bars = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for (i, row) in rows.iter().enumerate() {
        let date = match &schema.date {
            Some(col) => match row.get(col).and_then(parse_date) {
                Some(d) => d,
                None => {
                    dropped += 1;
                    continue;
                }
            },
            None => epoch + Duration::days(i as i64),
        };

        let numeric = |col: &Option<String>| -> Option<f64> {
            col.as_ref()
                .and_then(|c| row.get(c))
                .and_then(parse_numeric)
        };

        let (Some(open), Some(close), Some(high), Some(low), Some(volume)) = (
            numeric(&schema.open),
            numeric(&schema.close),
            numeric(&schema.high),
            numeric(&schema.low),
            numeric(&schema.volume),
        ) else {
            dropped += 1;
            continue;
        };

        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    if dropped > 0 {
        debug!(dropped, kept = bars.len(), "dropped rows with unusable values");
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Coerce a JSON value (number or numeric string) into a finite f64.
fn parse_numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Parse a date value as YYYY-MM-DD or YYYYMMDD.
fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
}
