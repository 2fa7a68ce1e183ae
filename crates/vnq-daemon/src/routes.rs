//! Axum router and HTTP handlers for vnq-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers (CORS, tracing) so tests can use the bare router.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use tracing::{error, info};
use vnq_md::{lookback_start, normalize, Interval, Quote, QuoteSeries, SourceError};

use crate::{
    api_types::{ErrorResponse, HealthResponse, QuoteQuery},
    state::AppState,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the application router wired to the given shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/quote", get(quote))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Handler failure, rendered as an [`ErrorResponse`].
#[derive(Debug)]
pub enum ApiError {
    /// `days` pushes the window start outside years 1..=9999.
    DaysOutOfRange(i64),
    /// The upstream fetch failed. Not retried.
    Upstream(SourceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::DaysOutOfRange(days) => {
                (StatusCode::BAD_REQUEST, format!("days out of range: {days}"))
            }
            ApiError::Upstream(err) => {
                error!(error = %err, "quote fetch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("upstream fetch failed: {err}"),
                )
            }
        };
        (status, Json(ErrorResponse { error: msg })).into_response()
    }
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

pub(crate) async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

// ---------------------------------------------------------------------------
// GET /api/quote
// ---------------------------------------------------------------------------

/// Daily closes for `symbol` over the last `days` days, ending today.
pub(crate) async fn quote(
    State(st): State<Arc<AppState>>,
    Query(q): Query<QuoteQuery>,
) -> Result<Json<QuoteSeries>, ApiError> {
    let (start, end) = quote_window((st.today)(), q.days)?;

    let frame = Quote::new(q.symbol.clone(), Arc::clone(&st.source))
        .history(&start, &end, Interval::D1)
        .await
        .map_err(ApiError::Upstream)?;

    let series = normalize(&q.symbol, &frame);
    info!(symbol = %q.symbol, %start, %end, rows = series.len(), "quote served");
    Ok(Json(series))
}

/// `(today - days, today)` as `YYYY-MM-DD` strings.
///
/// Negative `days` is accepted and yields a window that starts after it ends.
pub fn quote_window(today: NaiveDate, days: i64) -> Result<(String, String), ApiError> {
    let start = lookback_start(today, days).ok_or(ApiError::DaysOutOfRange(days))?;
    Ok((
        start.format("%Y-%m-%d").to_string(),
        today.format("%Y-%m-%d").to_string(),
    ))
}
