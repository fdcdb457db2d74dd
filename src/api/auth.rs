// =============================================================================
// Token Authentication — Axum extractor + query-parameter fallback
// =============================================================================
//
// Valid tokens come from the STOCKSCOPE_TOKENS environment variable as a
// comma-separated list. The Authorization header must carry
// `Bearer <token>`; the test endpoint additionally accepts `?token=<token>`
// in the query string. Every comparison is constant time.
//
// Usage as an Axum extractor:
//
//   async fn handler(AuthBearer(token): AuthBearer, ...) { ... }
//
// A missing or invalid token short-circuits the request with 401 before the
// handler body executes.
// =============================================================================

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::response::ApiError;

/// Environment variable holding the comma-separated token list.
const TOKENS_VAR: &str = "STOCKSCOPE_TOKENS";

// =============================================================================
// Constant-time comparison
// =============================================================================

/// Compare two byte slices in constant time. The comparison examines every
/// byte even after a mismatch so timing does not reveal the mismatch
/// position. (A length difference is observable, which is acceptable for
/// token auth — the attacker does not control the expected token length.)
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Load the configured token list. Empty entries are discarded.
fn valid_tokens() -> Vec<String> {
    std::env::var(TOKENS_VAR)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate a presented token against the configured list.
pub fn validate_token(token: &str) -> bool {
    let tokens = valid_tokens();
    if tokens.is_empty() {
        warn!("{TOKENS_VAR} is not set — all authenticated requests will be rejected");
        return false;
    }
    tokens
        .iter()
        .any(|t| constant_time_eq(token.as_bytes(), t.as_bytes()))
}

// =============================================================================
// Extractor
// =============================================================================

/// Axum extractor validating the `Authorization: Bearer <token>` header.
/// Yields the raw token for downstream audit logging.
pub struct AuthBearer(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthBearer
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(value) if value.starts_with("Bearer ") => &value[7..],
            _ => {
                warn!("missing or malformed Authorization header");
                return Err(unauthorized("Missing Authorization header"));
            }
        };

        if !validate_token(token) {
            warn!("invalid token presented");
            return Err(unauthorized("Invalid authorization token"));
        }

        Ok(AuthBearer(token.to_string()))
    }
}

fn unauthorized(message: &str) -> Response {
    ApiError::new(StatusCode::UNAUTHORIZED, "AUTHENTICATION_ERROR", message).into_response()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serializes tests that mutate the token environment variable.
    pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn constant_time_eq_identical() {
        assert!(constant_time_eq(b"hello", b"hello"));
    }

    #[test]
    fn constant_time_eq_different() {
        assert!(!constant_time_eq(b"hello", b"world"));
    }

    #[test]
    fn constant_time_eq_different_lengths() {
        assert!(!constant_time_eq(b"short", b"longer_string"));
    }

    #[test]
    fn constant_time_eq_empty() {
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn constant_time_eq_single_bit_diff() {
        assert!(!constant_time_eq(b"\x00", b"\x01"));
    }

    #[test]
    fn token_list_validation() {
        let _guard = env_lock();
        std::env::set_var(TOKENS_VAR, "alpha, beta ,,gamma");
        assert!(validate_token("alpha"));
        assert!(validate_token("beta"));
        assert!(validate_token("gamma"));
        assert!(!validate_token("delta"));
        assert!(!validate_token(""));
        std::env::remove_var(TOKENS_VAR);
    }
}
