// =============================================================================
// API Module — routing, authentication and the response envelope
// =============================================================================
//
// Thin plumbing over the analysis engine: nothing in here computes, it only
// validates callers, invokes the analyzer, and wraps the result.

pub mod auth;
pub mod response;
pub mod rest;
