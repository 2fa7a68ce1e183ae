//! Upstream source boundary for historical quote fetches.
//!
//! This module defines the request type, the error type and the
//! [`QuoteSource`] trait. The one concrete implementation lives in `vci.rs`.
//! No normalization belongs here: sources return the [`Frame`] as-is.

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, TimeDelta};

use crate::frame::Frame;
use crate::vci::VciSource;
use crate::Interval;

// ---------------------------------------------------------------------------
// Fetch request
// ---------------------------------------------------------------------------

/// Parameters for one historical fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Ticker symbol as given by the caller (e.g. `"ACB"`).
    pub symbol: String,
    /// Inclusive start date as `YYYY-MM-DD`.
    pub start: String,
    /// Inclusive end date as `YYYY-MM-DD`.
    pub end: String,
    pub interval: Interval,
}

impl HistoryRequest {
    /// Parse `start` and `end` as calendar dates.
    pub fn window(&self) -> Result<(NaiveDate, NaiveDate), SourceError> {
        Ok((parse_day(&self.start, "start")?, parse_day(&self.end, "end")?))
    }
}

/// `end - days`, or `None` when either end of the window leaves years
/// `1..=9999` (the range that formats as four-digit `YYYY-MM-DD`).
///
/// Negative `days` is allowed and gives a start after `end`.
pub fn lookback_start(end: NaiveDate, days: i64) -> Option<NaiveDate> {
    TimeDelta::try_days(days)
        .and_then(|d| end.checked_sub_signed(d))
        .filter(|start| four_digit_year(*start) && four_digit_year(end))
}

fn four_digit_year(day: NaiveDate) -> bool {
    (1..=9999).contains(&day.year())
}

fn parse_day(s: &str, field: &str) -> Result<NaiveDate, SourceError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| SourceError::Request(format!("{field} date '{s}' is not YYYY-MM-DD")))
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that a [`QuoteSource`] may return.
#[derive(Debug)]
pub enum SourceError {
    /// The request itself is malformed (bad date text, unknown interval).
    Request(String),
    /// Network or transport failure.
    Transport(String),
    /// The upstream API answered with a non-success status.
    Api { status: u16, message: String },
    /// A response payload could not be decoded.
    Decode(String),
    /// Source selection or construction failed.
    Config(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Request(msg) => write!(f, "invalid request: {msg}"),
            SourceError::Transport(msg) => write!(f, "transport error: {msg}"),
            SourceError::Api { status, message } => {
                write!(f, "source api error status={status}: {message}")
            }
            SourceError::Decode(msg) => write!(f, "decode error: {msg}"),
            SourceError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Upstream historical quote provider.
///
/// Object safe so callers can hold an `Arc<dyn QuoteSource>`; `Send + Sync`
/// so one instance can serve concurrent requests.
#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    /// Provider name as used in configuration (e.g. `"VCI"`).
    fn source_name(&self) -> &'static str;

    /// Fetch bars for `req.symbol` in the inclusive `[start, end]` window.
    ///
    /// Rows come back in upstream order; an unknown symbol or an empty window
    /// is an empty frame, not an error.
    async fn history(&self, req: &HistoryRequest) -> Result<Frame, SourceError>;
}

/// Resolve a source by configured name.
///
/// Only `VCI` is supported; the name is matched case-insensitively.
pub fn source_by_name(name: &str, base_url: Option<&str>) -> Result<Arc<dyn QuoteSource>, SourceError> {
    match name.trim().to_ascii_uppercase().as_str() {
        "VCI" => Ok(Arc::new(match base_url {
            Some(url) => VciSource::new_with_base_url(url.to_string()),
            None => VciSource::new(),
        })),
        other => Err(SourceError::Config(format!(
            "unknown source '{other}'. expected: VCI"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Quote handle
// ---------------------------------------------------------------------------

/// A symbol bound to a source.
#[derive(Clone)]
pub struct Quote {
    symbol: String,
    source: Arc<dyn QuoteSource>,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, source: Arc<dyn QuoteSource>) -> Self {
        Self {
            symbol: symbol.into(),
            source,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn source_name(&self) -> &'static str {
        self.source.source_name()
    }

    /// Fetch history between two `YYYY-MM-DD` dates.
    pub async fn history(&self, start: &str, end: &str, interval: Interval) -> Result<Frame, SourceError> {
        let req = HistoryRequest {
            symbol: self.symbol.clone(),
            start: start.to_string(),
            end: end.to_string(),
            interval,
        };
        self.source.history(&req).await
    }
}

impl fmt::Debug for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Quote")
            .field("symbol", &self.symbol)
            .field("source", &self.source.source_name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Cell;
    use std::sync::Mutex;

    /// Records the last request and returns a fixed frame.
    struct MockSource {
        frame: Frame,
        seen: Mutex<Option<HistoryRequest>>,
    }

    #[async_trait::async_trait]
    impl QuoteSource for MockSource {
        fn source_name(&self) -> &'static str {
            "mock"
        }

        async fn history(&self, req: &HistoryRequest) -> Result<Frame, SourceError> {
            *self.seen.lock().unwrap() = Some(req.clone());
            Ok(self.frame.clone())
        }
    }

    #[tokio::test]
    async fn quote_forwards_symbol_and_window() {
        let frame = Frame::from_rows(&["close"], vec![vec![Cell::Float(1.0)]]).unwrap();
        let mock = Arc::new(MockSource {
            frame: frame.clone(),
            seen: Mutex::new(None),
        });
        let quote = Quote::new("ACB", mock.clone());

        let got = quote
            .history("2024-01-01", "2024-01-31", Interval::D1)
            .await
            .unwrap();
        assert_eq!(got, frame);
        assert_eq!(quote.source_name(), "mock");

        let seen = mock.seen.lock().unwrap().clone().unwrap();
        assert_eq!(
            seen,
            HistoryRequest {
                symbol: "ACB".to_string(),
                start: "2024-01-01".to_string(),
                end: "2024-01-31".to_string(),
                interval: Interval::D1,
            }
        );
    }

    #[test]
    fn window_parses_dates() {
        let req = HistoryRequest {
            symbol: "ACB".to_string(),
            start: "2024-01-01".to_string(),
            end: "2024-02-29".to_string(),
            interval: Interval::D1,
        };
        let (start, end) = req.window().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn lookback_start_counts_back_from_end() {
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(
            lookback_start(end, 365),
            NaiveDate::from_ymd_opt(2023, 7, 1)
        );
        assert_eq!(lookback_start(end, -2), NaiveDate::from_ymd_opt(2024, 7, 2));
    }

    #[test]
    fn lookback_start_stays_within_four_digit_years() {
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(lookback_start(end, -3_000_000), None);
        assert_eq!(lookback_start(end, 3_000_000), None);
        assert_eq!(lookback_start(end, i64::MAX), None);

        let last = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        assert_eq!(lookback_start(last, 0), Some(last));
        assert_eq!(lookback_start(last, -1), None);

        let first = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
        assert_eq!(lookback_start(first, 0), Some(first));
        assert_eq!(lookback_start(first, 1), None);

        let beyond = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        assert_eq!(lookback_start(beyond, 1), None);
    }

    #[test]
    fn window_rejects_bad_date() {
        let req = HistoryRequest {
            symbol: "ACB".to_string(),
            start: "01/02/2024".to_string(),
            end: "2024-02-29".to_string(),
            interval: Interval::D1,
        };
        let err = req.window().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid request: start date '01/02/2024' is not YYYY-MM-DD"
        );
    }

    #[test]
    fn source_by_name_accepts_vci_any_case() {
        assert_eq!(source_by_name("vci", None).unwrap().source_name(), "VCI");
        assert_eq!(
            source_by_name("VCI", Some("http://127.0.0.1:9"))
                .unwrap()
                .source_name(),
            "VCI"
        );
    }

    #[test]
    fn source_by_name_rejects_unknown() {
        let err = source_by_name("TCBS", None).err().unwrap();
        assert_eq!(err.to_string(), "config error: unknown source 'TCBS'. expected: VCI");
    }

    #[test]
    fn source_error_display_api() {
        let err = SourceError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "source api error status=502: bad gateway");
    }

    #[test]
    fn source_error_display_transport() {
        let err = SourceError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn source_is_object_safe_via_arc() {
        let _s: Arc<dyn QuoteSource> = Arc::new(MockSource {
            frame: Frame::default(),
            seen: Mutex::new(None),
        });
    }
}
