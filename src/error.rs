// =============================================================================
// Analysis Error Taxonomy
// =============================================================================
//
// Every failure the engine can produce maps to exactly one kind. Callers
// branch on the kind (never on message text) to pick the transport-level
// response. There are no internal retries: each error is raised once and
// propagated whole.
//
// Fault classes:
//   client fault — the request itself is defective (bad code, bad date,
//                  history too thin to analyze)
//   server fault — upstream data source failed or the engine hit an
//                  unexpected numeric condition
// =============================================================================

use thiserror::Error;

/// Typed failure produced by the analysis engine.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Instrument code is malformed for the declared market.
    #[error("invalid stock code '{code}' for market {market}: {reason}")]
    InvalidCode {
        code: String,
        market: String,
        reason: String,
    },

    /// A start/end date string is not a valid YYYYMMDD calendar date.
    #[error("invalid date '{0}': expected YYYYMMDD")]
    InvalidDate(String),

    /// Upstream fetch failed or returned nothing. Never retried here.
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),

    /// Normalization could not resolve any of the required price columns.
    #[error("schema error: {0}")]
    SchemaError(String),

    /// Fewer than 2 usable rows remained after indicator computation.
    #[error("insufficient data: at least 2 usable rows are required, got {rows}")]
    InsufficientData { rows: usize },

    /// Unexpected numeric failure inside the computation pipeline.
    /// The detail string is logged server-side and sanitized at the edge.
    #[error("computation error: {0}")]
    ComputationError(String),
}

impl AnalysisError {
    /// Stable machine-readable code for the response envelope.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCode { .. } => "INVALID_CODE",
            Self::InvalidDate(_) => "INVALID_DATE",
            Self::DataUnavailable(_) => "DATA_UNAVAILABLE",
            Self::SchemaError(_) => "SCHEMA_ERROR",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::ComputationError(_) => "COMPUTATION_ERROR",
        }
    }

    /// HTTP status the caller should translate this kind into.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCode { .. } | Self::InvalidDate(_) | Self::InsufficientData { .. } => 400,
            Self::DataUnavailable(_) => 502,
            Self::SchemaError(_) | Self::ComputationError(_) => 500,
        }
    }

    /// Whether the failure reflects a defective request rather than a
    /// system problem. `InsufficientData` is a client fault: thin history,
    /// not a defect.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            Self::InvalidCode { .. } | Self::InvalidDate(_) | Self::InsufficientData { .. }
        )
    }

    /// Message safe to hand to an external caller. Computation details stay
    /// in the server logs.
    pub fn sanitized_message(&self) -> String {
        match self {
            Self::ComputationError(_) => "internal computation error".to_string(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_code() -> AnalysisError {
        AnalysisError::InvalidCode {
            code: "999999".into(),
            market: "A".into(),
            reason: "must start with 0, 3, 6, 688 or 8".into(),
        }
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(invalid_code().error_code(), "INVALID_CODE");
        assert_eq!(
            AnalysisError::DataUnavailable("x".into()).error_code(),
            "DATA_UNAVAILABLE"
        );
        assert_eq!(
            AnalysisError::InsufficientData { rows: 1 }.error_code(),
            "INSUFFICIENT_DATA"
        );
    }

    #[test]
    fn fault_classes() {
        assert!(invalid_code().is_client_fault());
        assert!(AnalysisError::InvalidDate("2024".into()).is_client_fault());
        assert!(AnalysisError::InsufficientData { rows: 0 }.is_client_fault());
        assert!(!AnalysisError::DataUnavailable("down".into()).is_client_fault());
        assert!(!AnalysisError::SchemaError("no columns".into()).is_client_fault());
        assert!(!AnalysisError::ComputationError("nan".into()).is_client_fault());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(invalid_code().status_code(), 400);
        assert_eq!(AnalysisError::DataUnavailable("x".into()).status_code(), 502);
        assert_eq!(AnalysisError::SchemaError("x".into()).status_code(), 500);
        assert_eq!(
            AnalysisError::InsufficientData { rows: 1 }.status_code(),
            400
        );
    }

    #[test]
    fn computation_error_is_sanitized() {
        let err = AnalysisError::ComputationError("divide by zero at bar 17".into());
        assert_eq!(err.sanitized_message(), "internal computation error");
        // Client faults keep their message — it is actionable for the caller.
        assert!(invalid_code().sanitized_message().contains("999999"));
    }
}
