// =============================================================================
// Data Provider Adapter
// =============================================================================
//
// Fetches raw daily price rows for an instrument from the upstream market
// data source. The adapter returns provider-native rows; schema mapping is
// the normalizer's job.

pub mod client;

pub use client::ProviderClient;
