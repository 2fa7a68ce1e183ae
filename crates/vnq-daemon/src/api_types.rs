//! Request and response types for the vnq-daemon HTTP endpoints.
//!
//! No business logic lives here. The `/api/quote` body is
//! [`vnq_md::QuoteSeries`], serialized as-is.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SYMBOL: &str = "ACB";
pub const DEFAULT_DAYS: i64 = 365;

// ---------------------------------------------------------------------------
// /health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// /api/quote
// ---------------------------------------------------------------------------

/// Query string of `GET /api/quote`. Missing fields take their defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteQuery {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_symbol() -> String {
    DEFAULT_SYMBOL.to_string()
}

fn default_days() -> i64 {
    DEFAULT_DAYS
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Body of every non-2xx response produced by a handler.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
